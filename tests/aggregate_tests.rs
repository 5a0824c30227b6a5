#[cfg(test)]
mod tests {
    use ingredient_scaler::{
        combine_quantities, parse_ingredient_list, scale_ingredient, IngredientEngine, ShoppingList,
    };
    use std::thread;

    #[test]
    fn test_combine_examples() {
        assert_eq!(combine_quantities("200 g", "300 g", "sugar"), "500 g");

        let garlic = combine_quantities("2 cloves", "1 bulb", "garlic");
        assert!(garlic.contains("2 cloves"));
        assert!(garlic.contains("1 bulb"));
        assert!(garlic.contains(" + "));
    }

    #[test]
    fn test_combine_is_commutative() {
        let pairs = vec![
            ("200 g", "1 kg"),
            ("2 cups", "3 tbsp"),
            ("½ cup", "2 tbsp"),
            ("1 pinch", "to taste"),
            ("1,000 g", "500 g"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                combine_quantities(a, b, "any"),
                combine_quantities(b, a, "any"),
                "{} / {}",
                a,
                b
            );
        }
        assert_eq!(combine_quantities("200 g", "1 kg", "flour"), "1.2 kg");
        assert_eq!(combine_quantities("1,000 g", "500 g", "flour"), "1½ kg");
    }

    #[test]
    fn test_repeated_combines_keep_small_amounts() {
        let grams = combine_quantities("4 g", "4 g", "salt");
        let salt_first = combine_quantities(&grams, "1 kg", "salt");
        let kilo = combine_quantities("1 kg", "4 g", "salt");
        let kilo_first = combine_quantities(&kilo, "4 g", "salt");
        assert_eq!(salt_first, "1008 g");
        assert_eq!(kilo_first, salt_first);
    }

    #[test]
    fn test_shopping_list_from_scaled_recipes() {
        let engine = IngredientEngine::default();
        let pancakes = parse_ingredient_list("**Batter**\n200 g flour\n2 eggs\n1 cup milk");
        let crepes = parse_ingredient_list("100 g flour\n3 eggs\n250 ml milk\nsalt");

        let doubled: Vec<_> = pancakes.iter().map(|i| scale_ingredient(i, 2.0)).collect();

        let mut list = ShoppingList::new(&engine);
        list.add_recipe("pancakes", &doubled, false);
        list.add_recipe("crepes", &crepes, false);

        let items = list.items();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["eggs", "flour", "milk", "salt"]);

        assert_eq!((items[0].quantity.as_str(), items[0].unit.as_str()), ("7", ""));
        assert_eq!((items[1].quantity.as_str(), items[1].unit.as_str()), ("500", "g"));
        assert_eq!(items[2].source_recipes.len(), 2);
        assert_eq!(items[3].source_recipes.len(), 1);
        assert!(!names.contains(&"Batter"));

        assert!(list.remove_recipe("crepes"));
        assert!(!list.remove_recipe("crepes"));
        assert_eq!(list.items().len(), 3);
    }

    #[test]
    fn test_lists_built_on_separate_threads() {
        let engine = IngredientEngine::default();
        let recipes = vec![
            ("a", "200 g sugar\n1 egg"),
            ("b", "300 g sugar\n2 eggs"),
            ("c", "1 kg sugar"),
        ];

        let lists: Vec<ShoppingList<'_>> = thread::scope(|scope| {
            let handles: Vec<_> = recipes
                .iter()
                .map(|(id, text)| {
                    let engine = &engine;
                    scope.spawn(move || {
                        let mut list = ShoppingList::new(engine);
                        list.add_recipe(id, &engine.parse_ingredient_list(text), false);
                        list
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut combined = ShoppingList::new(&engine);
        for list in lists {
            combined.merge(list);
        }
        assert_eq!(combined.recipe_count(), 3);

        let items = combined.items();
        let sugar = items.iter().find(|i| i.name == "sugar").unwrap();
        assert_eq!((sugar.quantity.as_str(), sugar.unit.as_str()), ("1½", "kg"));
    }
}
