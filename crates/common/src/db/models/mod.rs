//! SeaORM entity models
//!
//! Database entities for TextSum

mod text_summary;

pub use text_summary::{
    Entity as TextSummaryEntity,
    Model as TextSummary,
    ActiveModel as TextSummaryActiveModel,
    Column as TextSummaryColumn,
};
