pub mod homepage;
