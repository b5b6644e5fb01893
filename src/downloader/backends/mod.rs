// Download capability adapters

pub mod pytube;
pub mod ytdlp;

pub use pytube::PytubeBackend;
pub use ytdlp::YtDlpBackend;
