//! Validation of the loosely typed form fields of the delegated API

pub mod fields;

pub use fields::{
    parse_expire, parse_privacy, parse_size, parse_uuid, require, validate_crawl_url,
    validate_expire_secs, validate_filename, validate_filename_chars, validate_http_url,
    validate_positive_size, validate_privacy_literal, validate_uuid_literal,
};
