#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use dcs_contract as contract;
pub use dcs_graph as graph;
pub use dcs_utils as utils;
pub use dcs_xml as xml;
