mod codec_tests;
mod config_tests;
mod display_tests;
mod generators;
mod store_tests;
