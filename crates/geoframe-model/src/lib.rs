pub mod columns;
pub mod error;
pub mod field;
pub mod imputation;
pub mod range;
pub mod schema;
pub mod source;

pub use error::{PipelineError, Result};
pub use field::{Bound, Field, FieldKind};
pub use imputation::{FillStrategy, Imputation};
pub use range::DateRange;
pub use schema::Schema;
pub use source::SourceDescriptor;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_keeps_first_declaration() {
        let mut schema = Schema::new();
        assert!(schema.insert(Field::numeric("temperature", 0.0, 500.0)));
        assert!(!schema.insert(Field::nominal("temperature")));
        assert_eq!(schema.len(), 1);
        assert!(schema.get("temperature").unwrap().kind.is_numeric());
    }

    #[test]
    fn extend_reports_new_names_only() {
        let mut schema: Schema = [Field::nominal("country_code")].into_iter().collect();
        let added = schema.extend([
            Field::nominal("country_code"),
            Field::boolean("holiday"),
            Field::date("date"),
        ]);
        assert_eq!(added, vec!["holiday".to_string(), "date".to_string()]);
        let names: Vec<&str> = schema.names().collect();
        assert_eq!(names, vec!["country_code", "holiday", "date"]);
    }

    #[test]
    fn strategy_kind_compatibility() {
        let numeric = Field::numeric("x", 0.0, 1.0).kind;
        let nominal = FieldKind::Nominal;
        assert!(FillStrategy::Mean.supports(&numeric));
        assert!(!FillStrategy::Median.supports(&nominal));
        assert!(FillStrategy::ForwardFill.supports(&nominal));
        assert!(FillStrategy::Zero.supports(&FieldKind::Boolean));
        assert!(!FillStrategy::Zero.supports(&FieldKind::Date));
    }

    #[test]
    fn row_bounds_have_no_static_value() {
        let field = Field::numeric("deaths", 0.0, Bound::per_row("cases"));
        let (min, max) = field.kind.bounds();
        assert_eq!(min.and_then(Bound::static_value), Some(0.0));
        assert_eq!(max.and_then(Bound::static_value), None);
    }

    #[test]
    fn error_exposes_column() {
        let err = PipelineError::ImputationExhaustion {
            column: "population".to_string(),
            remaining: 3,
        };
        assert_eq!(err.column(), Some("population"));
        assert!(err.to_string().contains("3 null"));
    }
}
