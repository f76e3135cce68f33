//! Identifier generation.
//!
//! Both tokens use a time prefix and a random suffix. The time prefix keeps them roughly sortable and easy to
//! eyeball in logs; the 64 random bits make collisions a non-issue in practice. The transaction id is the gateway
//! correlation token and is stored verbatim so that callbacks can be matched to orders by exact lookup.

use chrono::Utc;

use crate::db_types::{OrderId, TransactionId};

pub fn new_transaction_id() -> TransactionId {
    TransactionId(format!("txn-{}-{:016x}", Utc::now().format("%y%m%d%H%M%S"), rand::random::<u64>()))
}

pub fn new_order_id() -> OrderId {
    OrderId(format!("ord-{}-{:016x}", Utc::now().format("%y%m%d%H%M%S"), rand::random::<u64>()))
}
