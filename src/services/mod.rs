pub mod batch_checker;
pub mod export;
pub mod m3u_parser;
pub mod metrics;
pub mod prober;
pub mod url_validator;

#[cfg(test)]
pub mod test_support;
