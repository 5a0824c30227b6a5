#[cfg(test)]
mod tests {
    use ingredient_scaler::{
        enrich_step_with_ingredients, parse_ingredient_list, scale_amount, DisplayAmount,
        DisplayMode, EnrichedPart, IngredientEngine,
    };

    fn joined(parts: &[EnrichedPart]) -> String {
        parts.iter().map(|p| p.content()).collect()
    }

    #[test]
    fn test_parts_reproduce_the_step() {
        let engine = IngredientEngine::default();
        let ingredients = parse_ingredient_list(
            "**Masa**\n200 g harina\n2 huevos\n100 g azúcar\n1 pinch sal\n\
             2 tbsp olive oil\n1 tbsp oil\n3 cherry tomatoes",
        );
        let steps = vec![
            "Mezcla la harina con los huevos y el azucar.",
            "Añade la SAL, después el aceite.",
            "Heat the olive oil and the oil; halve the tomatoes.",
            "Nothing to see here.",
            "Harina, harina y más harina",
            "¡Huevos! 🥚 Sal…",
            "",
        ];

        for step in steps {
            for mode in [DisplayMode::Original, DisplayMode::Metric, DisplayMode::American] {
                let parts = engine.enrich_step_for_display(step, &ingredients, 2.0, false, mode);
                assert_eq!(joined(&parts), step, "{:?}", mode);
                assert!(parts.iter().all(|p| !p.content().is_empty()));
            }
        }
    }

    #[test]
    fn test_scaled_quantities_in_parts() {
        let ingredients = parse_ingredient_list("200 g harina\n2 huevos\nsal");
        let step = "Bate los huevos, añade la harina y la sal.";

        let parts = enrich_step_with_ingredients(
            step,
            &ingredients,
            |amount| scale_amount(amount, 1.5),
            false,
            |amount, unit, _| DisplayAmount::new(amount, unit),
        );
        assert_eq!(joined(&parts), step);

        let annotated: Vec<(&str, usize, Option<&str>)> = parts
            .iter()
            .filter_map(|p| match p {
                EnrichedPart::Ingredient {
                    content,
                    index,
                    formatted_quantity,
                } => Some((content.as_str(), *index, formatted_quantity.as_deref())),
                EnrichedPart::Text { .. } => None,
            })
            .collect();
        assert_eq!(
            annotated,
            vec![
                ("huevos", 1, Some("3")),
                ("harina", 0, Some("300 g")),
                ("sal", 2, None),
            ]
        );
    }

    #[test]
    fn test_parts_serialize_with_type_tag() {
        let engine = IngredientEngine::default();
        let ingredients = parse_ingredient_list("2 eggs");
        let parts = engine.enrich_step_for_display(
            "Beat the eggs.",
            &ingredients,
            1.0,
            false,
            DisplayMode::Original,
        );

        let json = serde_json::to_value(&parts).unwrap();
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[0]["content"], "Beat the ");
        assert_eq!(json[1]["type"], "ingredient");
        assert_eq!(json[1]["content"], "eggs");
        assert_eq!(json[1]["index"], 0);
        assert_eq!(json[1]["formatted_quantity"], "2");
    }
}
