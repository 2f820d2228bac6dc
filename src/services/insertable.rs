use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable};

use crate::schema::{dishes, drinks, order_dishes, order_drinks, orders, user_roles, users};

// The changeset derives use `treat_none_as_null`: a PUT replaces the whole
// row, so an absent optional field clears the column instead of keeping the
// old value.

#[derive(Insertable, Clone)]
#[diesel(table_name = user_roles)]
pub struct NewRole {
    pub title: String,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = drinks)]
#[diesel(treat_none_as_null = true)]
pub struct NewDrink {
    pub title: String,
    pub price: f64,
    pub discount: Option<f64>,
    pub description: Option<String>,
    pub drink_image: Option<String>,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = dishes)]
#[diesel(treat_none_as_null = true)]
pub struct NewDish {
    pub dish_name: String,
    pub ingredients: String,
    pub dish_type_id: i64,
    pub price: f64,
    pub discount: Option<f64>,
    pub dish_image: Option<String>,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub struct NewUser {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub login: String,
    pub user_password: String,
    pub email: String,
    pub role_id: i64,
    pub personal_discount: Option<f64>,
}

#[derive(Insertable, AsChangeset, Clone)]
#[diesel(table_name = orders)]
#[diesel(treat_none_as_null = true)]
pub struct NewOrder {
    pub user_id: i64,
    pub payment_type_id: i64,
    pub pickup_type_id: i64,
    pub order_date: DateTime<Utc>,
    pub discount: Option<f64>,
    pub total_cost: f64,
    pub comment: Option<String>,
    pub order_status: Option<String>,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = order_dishes)]
pub struct NewOrderDish {
    pub order_id: i64,
    pub dish_id: i64,
    pub quantity: i32,
}

#[derive(Insertable, Clone)]
#[diesel(table_name = order_drinks)]
pub struct NewOrderDrink {
    pub order_id: i64,
    pub drink_id: i64,
    pub quantity: i32,
}
