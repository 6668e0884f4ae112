//! Catalog-driven proof-point selection and objection prediction.
//!
//! Nothing here invents copy: proof points come from the injected
//! [`ProductConfig`](crate::config::ProductConfig), objections from a fixed
//! rule list.

mod objections;
mod proof_points;

pub use objections::{
    predict_objection, predict_objection_for, preemptive_line, Objection, ObjectionContext,
    ObjectionRule, OBJECTION_RULES,
};
pub use proof_points::{
    bridge_phrase, proof_point_score, select_best_proof_point, select_with_feedback,
};
