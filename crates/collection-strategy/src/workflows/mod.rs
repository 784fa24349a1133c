pub mod collections;
pub mod ledger;
