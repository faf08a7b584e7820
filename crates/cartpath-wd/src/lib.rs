pub mod backend;
pub mod webdriver;

pub use backend::WebDriverBackend;
