//! Background job implementations.

pub mod ocr;
