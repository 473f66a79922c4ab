//! Web chat front-end for the Salesforce Agentforce agent API

pub mod agentforce;
pub mod config;
pub mod error;
pub mod handlers;
pub mod render;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;
