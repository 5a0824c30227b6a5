#[cfg(test)]
mod tests {
    use ingredient_scaler::{
        convert_for_display, convert_ingredient, is_volume_unit, is_weight_unit, normalize_unit,
        parse_quantity, scale_amount, scale_for_portions, scale_ingredient, DisplayMode,
        IngredientEngine, ParsedIngredient, Tables, Unit,
    };
    use std::io::Write;

    #[test]
    fn test_unit_normalization() {
        let test_cases = vec![
            ("Cucharadas", Some(Unit::Tablespoon)),
            ("tbsp.", Some(Unit::Tablespoon)),
            ("cups", Some(Unit::Cup)),
            ("g", Some(Unit::Gram)),
            ("handful of love", None),
            ("", None),
        ];

        for (input, expected) in test_cases {
            assert_eq!(normalize_unit(input), expected, "unit '{}'", input);
        }

        assert!(is_volume_unit("ml"));
        assert!(!is_volume_unit("kg"));
        assert!(is_weight_unit("gramos"));
        assert!(!is_weight_unit("cloves"));
    }

    #[test]
    fn test_weight_round_trip_within_half_percent() {
        for grams in [1234.0, 4567.0, 250.0, 2000.0] {
            let kg = convert_ingredient(&grams.to_string(), "g", "kg", "flour");
            assert!(kg.success);
            let back = convert_ingredient(&kg.amount, "kg", "g", "flour");
            assert!(back.success);

            let value = parse_quantity(&back.amount).value.expect("numeric result");
            assert!(
                (value - grams).abs() / grams <= 0.005,
                "{} g came back as {}",
                grams,
                back.amount
            );
        }
    }

    #[test]
    fn test_density_conversions() {
        let test_cases = vec![
            ("1", "cup", "g", "flour", "125"),
            ("2", "cups", "g", "all-purpose flour", "250"),
            ("1", "cup", "g", "butter", "227"),
            ("200", "g", "cups", "sugar", "1"),
        ];

        for (amount, from, to, name, expected) in test_cases {
            let result = convert_ingredient(amount, from, to, name);
            assert!(result.success, "{} {} {}", amount, from, name);
            assert_eq!(result.amount, expected, "{} {} -> {} of {}", amount, from, to, name);
        }
    }

    #[test]
    fn test_failed_conversions_return_original_amount() {
        let test_cases = vec![
            ("2", "cloves", "g", "garlic"),
            ("1", "splash", "ml", "milk"),
            ("some", "cup", "ml", "milk"),
        ];

        for (amount, from, to, name) in test_cases {
            let result = convert_ingredient(amount, from, to, name);
            assert!(!result.success);
            assert_eq!(result.amount, amount);
        }
    }

    #[test]
    fn test_display_modes() {
        let shown = convert_for_display("250", "g", "flour", DisplayMode::American);
        assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("2", "cups"));

        let shown = convert_for_display("8", "oz", "cheese", DisplayMode::Metric);
        assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("227", "g"));

        let tripled = scale_amount("500", 3.0);
        let shown = convert_for_display(&tripled, "g", "flour", DisplayMode::Metric);
        assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("1½", "kg"));

        let shown = convert_for_display("250", "g", "flour", DisplayMode::Original);
        assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("250", "g"));

        let shown = convert_for_display("3", "cloves", "garlic", DisplayMode::American);
        assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("3", "cloves"));
    }

    #[test]
    fn test_scaling_properties() {
        let amounts = vec!["200 g", "1/2 cup", "2-3", "a pinch", "1½", ""];
        for amount in amounts {
            assert_eq!(scale_amount(amount, 1.0), amount);
            assert_eq!(scale_amount(amount, 0.0), amount);
        }

        assert_eq!(scale_amount("1/2 cup", 3.0), "1½ cup");
        assert_eq!(scale_amount("200 g", 0.0), "200 g");
        assert_eq!(scale_amount("1,000 g", 2.0), "2000 g");
        assert_eq!(scale_for_portions("3 eggs", 4.0, 2.0), "1½ eggs");
        assert_eq!(scale_for_portions("3 eggs", 4.0, 0.0), "3 eggs");
    }

    #[test]
    fn test_scale_then_display() {
        let engine = IngredientEngine::default();
        let flour = engine.parse_ingredient_line("125 g flour");
        let scaled = scale_ingredient(&flour, 2.0);
        assert_eq!(scaled.amount.display, "250");

        let shown = engine.convert_for_display(
            &scaled.amount.display,
            &scaled.unit,
            &scaled.name,
            DisplayMode::American,
        );
        assert_eq!((shown.amount.as_str(), shown.unit.as_str()), ("2", "cups"));
    }

    #[test]
    fn test_tables_loaded_from_file_add_a_locale() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "unit_synonyms": [{{ "token": "xícara", "unit": "cup" }}],
                "densities": [{{ "ingredient_name_pattern": "farinha", "grams_per_cup": 120.0 }}]
            }}"#
        )
        .unwrap();

        let engine = IngredientEngine::new(Tables::load(file.path()).unwrap()).unwrap();
        let parsed: ParsedIngredient = engine.parse_ingredient_line("1 xícara de farinha");
        assert_eq!(parsed.unit, "xícara");
        assert_eq!(parsed.name, "farinha");

        let result = engine.convert_ingredient("1", "xícara", "g", "farinha");
        assert!(result.success);
        assert_eq!(result.amount, "120");

        // The shared default engine is unaffected
        assert_eq!(normalize_unit("xícara"), None);
    }
}
