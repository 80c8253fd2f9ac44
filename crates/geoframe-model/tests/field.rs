//! Field declarations as written in pipeline manifests.

use geoframe_model::{Bound, Field, FieldKind, FillStrategy, Imputation};

#[test]
fn numeric_field_from_toml() {
    let text = r#"
name = "temperature"
type = "numeric"
minimum = 0.0
maximum = { column = "ceiling" }
mark_missing = true
imputations = [
    { strategy = "mean", keys = ["quarter", "country_name"] },
    { strategy = "mean" },
]
"#;
    let field: Field = toml::from_str(text).expect("parse field");
    assert_eq!(field.name, "temperature");
    assert!(field.mark_missing);
    assert_eq!(
        field.kind,
        FieldKind::Numeric {
            minimum: Some(Bound::Static(0.0)),
            maximum: Some(Bound::per_row("ceiling")),
        }
    );
    assert_eq!(
        field.imputations,
        vec![
            Imputation::new(FillStrategy::Mean, ["quarter", "country_name"]),
            Imputation::global(FillStrategy::Mean),
        ]
    );
}

#[test]
fn nominal_field_defaults() {
    let field: Field = toml::from_str("name = \"country_name\"\ntype = \"nominal\"\n")
        .expect("parse field");
    assert_eq!(field, Field::nominal("country_name"));
    assert!(!field.has_imputations());
}

#[test]
fn ordinal_bounds_are_optional() {
    let field: Field =
        toml::from_str("name = \"c1_school_closing\"\ntype = \"ordinal\"\nmaximum = 3.0\n")
            .expect("parse field");
    let (min, max) = field.kind.bounds();
    assert!(min.is_none());
    assert_eq!(max, Some(&Bound::Static(3.0)));
}

#[test]
fn imputation_display_lists_keys() {
    let rule = Imputation::new(FillStrategy::ForwardFill, ["region_name", "country_name"]);
    assert_eq!(rule.to_string(), "forward_fill by [region_name, country_name]");
    assert_eq!(
        Imputation::global(FillStrategy::Median).to_string(),
        "median (global)"
    );
}
