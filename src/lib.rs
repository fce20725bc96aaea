#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use pr_archive as archive;
pub use pr_cfg as cfg;
pub use pr_utils as utils;
