use std::fmt;
use std::str::FromStr;

/// How a category prices its items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceShape {
    /// Small, medium and large prices
    Sized,
    /// One price per item
    Single,
}

/// The closed set of menu categories, each stored in its own collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Pizza,
    Drink,
    Dessert,
    Salad,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Pizza,
        Category::Drink,
        Category::Dessert,
        Category::Salad,
    ];

    /// Path segment under `/api`
    pub fn slug(self) -> &'static str {
        match self {
            Category::Pizza => "pizzas",
            Category::Drink => "bebidas",
            Category::Dessert => "sobremesas",
            Category::Salad => "saladas",
        }
    }

    pub fn collection(self) -> &'static str {
        self.slug()
    }

    pub fn price_shape(self) -> PriceShape {
        match self {
            Category::Pizza => PriceShape::Sized,
            Category::Drink | Category::Dessert | Category::Salad => PriceShape::Single,
        }
    }

    /// Acknowledgment returned after a successful create
    pub fn created_message(self) -> &'static str {
        match self {
            Category::Pizza => "Pizza salva com sucesso!",
            Category::Drink => "Bebida salva com sucesso!",
            Category::Dessert => "Sobremesa salva com sucesso!",
            Category::Salad => "Salada salva com sucesso!",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.slug() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_parses_back() {
        for category in Category::ALL {
            assert_eq!(category.slug().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn test_unknown_slug() {
        assert_eq!("calzones".parse::<Category>(), Err("calzones".to_string()));
        assert!("Pizzas".parse::<Category>().is_err());
    }

    #[test]
    fn test_only_pizza_is_sized() {
        assert_eq!(Category::Pizza.price_shape(), PriceShape::Sized);
        assert_eq!(Category::Drink.price_shape(), PriceShape::Single);
        assert_eq!(Category::Dessert.price_shape(), PriceShape::Single);
        assert_eq!(Category::Salad.price_shape(), PriceShape::Single);
    }
}
