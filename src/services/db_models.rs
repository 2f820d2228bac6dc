use chrono::{DateTime, Utc};
use diesel::Queryable;
use serde::Serialize;

#[derive(Queryable, Debug, Clone, Serialize)]
pub struct Role {
    pub id_role: i64,
    pub title: String,
}

#[derive(Queryable, Debug, Clone, Serialize)]
pub struct Drink {
    pub id_drink: i64,
    pub title: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub description: Option<String>,
    pub drink_image: Option<String>,
}

#[derive(Queryable, Debug, Clone, Serialize)]
pub struct Dish {
    pub id_dish: i64,
    pub dish_name: String,
    pub ingredients: String,
    pub dish_type_id: i64,
    pub price: f64,
    pub discount: Option<f64>,
    pub dish_image: Option<String>,
}

/// Dish joined with its type label, the shape the catalog endpoints return.
#[derive(Debug, Clone, Serialize)]
pub struct DishWithType {
    #[serde(flatten)]
    pub dish: Dish,
    pub dish_type_title: String,
}

/// The password column never leaves the server, on any endpoint.
#[derive(Queryable, Debug, Clone, Serialize)]
pub struct User {
    pub id_user: i64,
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub login: String,
    #[serde(skip_serializing)]
    pub user_password: String,
    pub email: String,
    pub role_id: i64,
    pub personal_discount: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserWithRole {
    #[serde(flatten)]
    pub user: User,
    pub role_title: String,
}

#[derive(Queryable, Debug, Clone, Serialize)]
pub struct Order {
    pub id_order: i64,
    pub user_id: i64,
    pub payment_type_id: i64,
    pub pickup_type_id: i64,
    pub order_date: DateTime<Utc>,
    pub discount: Option<f64>,
    pub total_cost: f64,
    pub comment: Option<String>,
    pub order_status: Option<String>,
}

/// Order header joined with the customer name and the payment/pickup labels.
#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: Order,
    pub user_name: String,
    pub payment_type_title: String,
    pub pickup_type_title: String,
}

#[derive(Queryable, Debug, Clone, Serialize)]
pub struct OrderDishLine {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: i64,
    pub quantity: i32,
}

#[derive(Queryable, Debug, Clone, Serialize)]
pub struct OrderDrinkLine {
    pub id: i64,
    pub order_id: i64,
    pub drink_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDishDetails {
    #[serde(flatten)]
    pub line: OrderDishLine,
    pub dish_name: String,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDrinkDetails {
    #[serde(flatten)]
    pub line: OrderDrinkLine,
    pub drink_title: String,
}

/// Fully hydrated order: joined header plus both line item arrays.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub summary: OrderSummary,
    pub dishes: Vec<OrderDishDetails>,
    pub drinks: Vec<OrderDrinkDetails>,
}

/// Dish line with the per-line total, returned by `GET /orders/:id/dishes`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDishWithTotal {
    #[serde(flatten)]
    pub details: OrderDishDetails,
    pub total_price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id_user: 1,
            last_name: "Ivanov".into(),
            first_name: "Ivan".into(),
            middle_name: None,
            login: "ivan".into(),
            user_password: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
            email: "ivan@example.com".into(),
            role_id: 1,
            personal_discount: Some(5.0),
        }
    }

    #[test]
    fn user_json_never_contains_the_password() {
        let value = serde_json::to_value(sample_user()).unwrap();
        assert!(value.get("user_password").is_none());
        assert_eq!(value["login"], "ivan");
    }

    #[test]
    fn user_with_role_flattens_and_adds_the_label() {
        let value = serde_json::to_value(UserWithRole {
            user: sample_user(),
            role_title: "user".into(),
        })
        .unwrap();
        assert_eq!(value["id_user"], 1);
        assert_eq!(value["role_title"], "user");
        assert!(value.get("user_password").is_none());
    }

    #[test]
    fn order_details_nest_line_arrays_next_to_header_fields() {
        let order = Order {
            id_order: 10,
            user_id: 1,
            payment_type_id: 1,
            pickup_type_id: 1,
            order_date: "2024-01-01T10:00:00Z".parse().unwrap(),
            discount: None,
            total_cost: 1500.0,
            comment: None,
            order_status: None,
        };
        let details = OrderDetails {
            summary: OrderSummary {
                order,
                user_name: "Ivan Ivanov".into(),
                payment_type_title: "card".into(),
                pickup_type_title: "delivery".into(),
            },
            dishes: vec![OrderDishDetails {
                line: OrderDishLine { id: 1, order_id: 10, dish_id: 3, quantity: 2 },
                dish_name: "Borscht".into(),
                price: 450.0,
            }],
            drinks: vec![OrderDrinkDetails {
                line: OrderDrinkLine { id: 1, order_id: 10, drink_id: 5, quantity: 1 },
                drink_title: "Kvass".into(),
            }],
        };

        let value = serde_json::to_value(details).unwrap();
        assert_eq!(value["id_order"], 10);
        assert_eq!(value["user_name"], "Ivan Ivanov");
        assert_eq!(value["dishes"].as_array().unwrap().len(), 1);
        assert_eq!(value["dishes"][0]["dish_id"], 3);
        assert_eq!(value["dishes"][0]["quantity"], 2);
        assert_eq!(value["drinks"][0]["drink_id"], 5);
    }
}
