//! Feature flag evaluation runtime for Rust.
//!
//! Flags are described in a YAML, JSON, or TOML document that a configured
//! [`Retriever`] fetches, a background task keeps the in-memory snapshot
//! up-to-date, and evaluations of tracked flags are exported as events in
//! batches.

#![warn(missing_docs)]

mod builder;
mod client;
mod errors;
mod eval;
mod export;
mod model;
mod notify;
mod retrieve;
mod store;
mod updater;
mod user;
mod value;

pub use builder::ClientBuilder;
pub use client::Client;
pub use errors::{ClientError, ErrorKind};
pub use eval::details::EvaluationDetails;

pub use model::enums::{FlagFormat, VariationKind};
pub use model::flag::{
    Flag, ParseError, Progressive, ProgressivePercentage, ReleaseRamp, Rollout,
};

pub use export::event::FeatureEvent;
pub use export::file::FileExporter;
pub use export::log::LogExporter;
pub use export::webhook::WebhookExporter;
pub use export::{BulkExporter, ExportError, ExportSink, SingleExporter};

pub use retrieve::file::FileRetriever;
pub use retrieve::github::GithubRetriever;
pub use retrieve::http::HttpRetriever;
pub use retrieve::{Retriever, RetrieverError};

pub use notify::{LogNotifier, Notifier, UpdateSummary, UpdatedFlag};

pub use user::{AttributeValue, User};
pub use value::{FlagValue, VariationValue};
