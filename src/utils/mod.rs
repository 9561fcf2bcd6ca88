pub mod rng;
pub mod url;

pub use rng::XorShift;
pub use url::encode_query_component;
