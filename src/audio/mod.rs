pub mod pcm;
pub mod wav;

pub use pcm::PcmFormat;
pub use wav::{build_wav, write_wav, WavFile};
