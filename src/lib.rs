//! Near-duplicate detection and removal for text corpora.
//!
//! A run goes through three stages:
//! - **Candidates** (`candidates`): word shingles, MinHash signatures and
//!   banded LSH find documents that are probably similar.
//! - **Verification** (`verify`): an exact indel ratio confirms candidate
//!   pairs, scored in parallel with rayon.
//! - **Resolution** (`resolve`): each connected cluster of confirmed pairs
//!   keeps its largest file; the rest are deleted and logged.

pub mod audit_log;
pub mod candidates;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod exit;
pub mod fuzzy;
pub mod lsh;
pub mod minhash;
pub mod pipeline;
pub mod reporting;
pub mod resolve;
pub mod results;
pub mod shingle;
pub mod union_find;
pub mod verify;

pub use candidates::{find_candidates, CandidateMap};
pub use config::DedupConfig;
pub use corpus::Corpus;
pub use error::{DedupError, Result};
pub use resolve::{Resolution, Resolver};
pub use verify::{verify, ConfirmedMap, ConfirmedPair};
