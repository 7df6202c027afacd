pub mod catalog;
pub mod run;
pub mod simulate;
pub mod test_rpc;
