//! # BDR Outreach
//!
//! Evidence-grounded drafting for B2B outbound: build a research artifact for
//! a prospect, score it against the ICP, pick proof points, render
//! tone-aware messages and lay them out as a multi-touch sequence with a QA
//! gate on every written touch.
//!
//! ## Pipeline
//!
//! ```text
//! CRM records + research ─► artifact ─► enrichment ─► ICP score ─► tier
//!                                                            │
//!        catalog (proof points, CTAs) ─► renderer ◄──────────┘
//!                                          │
//!                                  sequence + QA ─► draft rows ─► SQLite
//!                                          ▲
//!                         feedback (stats, sentiment, corrections)
//! ```
//!
//! Generation is deterministic. Langbase pipes may re-rank pains or polish
//! wording when configured, and every generative output is validated and
//! falls back to the deterministic result.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bdr_outreach::{ProductConfig, OutreachEngine, ProspectInput};
//! use bdr_outreach::render::Tone;
//! use bdr_outreach::sequence::SequenceOptions;
//!
//! let engine = OutreachEngine::new(Arc::new(ProductConfig::builtin()));
//! let outcome = engine.research(&ProspectInput::new(contact))?;
//! let scoring = engine.score(&outcome.artifact);
//! let options = SequenceOptions::new(Tone::Friendly, true, start_date);
//! let sequence = engine.sequence(&outcome.artifact, &scoring, &options)?;
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Environment configuration and the product catalog.
pub mod config;
/// Prospect-to-drafts orchestration.
pub mod engine;
/// Signal enrichment from postings, funding and news.
pub mod enrichment;
/// Error types and result aliases.
pub mod error;
/// Evidence primitives.
pub mod evidence;
/// Outcome feedback.
pub mod feedback;
/// Langbase pipe client.
pub mod langbase;
/// System prompts for the refinement pipes.
pub mod prompts;
/// QA gate.
pub mod qa;
/// Generative refinement with deterministic fallback.
pub mod refine;
/// Message rendering.
pub mod render;
/// Research artifacts.
pub mod research;
/// ICP scoring.
pub mod scoring;
/// Proof-point and objection selection.
pub mod selection;
/// Sequence generation.
pub mod sequence;
/// Persistence.
pub mod storage;

pub use config::{Config, ProductConfig};
pub use engine::{OutreachEngine, ProspectInput};
pub use error::{AppError, AppResult};
pub use evidence::{Evidence, Evidenced};
