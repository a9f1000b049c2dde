pub mod harness;

mod auth_flows;
mod identity_flows;
mod listing_flows;
mod ping_flows;
mod register_flows;
