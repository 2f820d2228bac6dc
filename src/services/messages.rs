use actix::Message;
use chrono::NaiveDateTime;
use diesel::QueryResult;
use serde::{Deserialize, Serialize};

use crate::services::db_models::{
    Dish, DishWithType, Drink, Order, OrderDetails, OrderDishLine, OrderDishWithTotal,
    OrderDrinkDetails, OrderDrinkLine, OrderSummary, Role, User, UserWithRole,
};
use crate::services::insertable::{NewDish, NewDrink, NewOrder, NewUser};

// diagnostics

#[derive(Message)]
#[rtype(result = "QueryResult<NaiveDateTime>")]
pub struct PingDatabase;

// roles: read-only plus the startup seed

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<Role>>")]
pub struct FetchRoles;

#[derive(Message)]
#[rtype(result = "QueryResult<Role>")]
pub struct FetchRole(pub i64);

/// Inserts the `user` and `admin` rows when absent; returns how many were
/// created.
#[derive(Message)]
#[rtype(result = "QueryResult<usize>")]
pub struct SeedRoles;

// drinks

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<Drink>>")]
pub struct FetchDrinks;

#[derive(Message)]
#[rtype(result = "QueryResult<Drink>")]
pub struct FetchDrink(pub i64);

#[derive(Message)]
#[rtype(result = "QueryResult<Drink>")]
pub struct CreateDrink(pub NewDrink);

#[derive(Message)]
#[rtype(result = "QueryResult<Drink>")]
pub struct UpdateDrink {
    pub id: i64,
    pub changes: NewDrink,
}

#[derive(Message)]
#[rtype(result = "QueryResult<Drink>")]
pub struct DeleteDrink(pub i64);

// dishes

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<DishWithType>>")]
pub struct FetchDishes;

#[derive(Message)]
#[rtype(result = "QueryResult<DishWithType>")]
pub struct FetchDish(pub i64);

#[derive(Message)]
#[rtype(result = "QueryResult<Dish>")]
pub struct CreateDish(pub NewDish);

#[derive(Message)]
#[rtype(result = "QueryResult<Dish>")]
pub struct UpdateDish {
    pub id: i64,
    pub changes: NewDish,
}

#[derive(Message)]
#[rtype(result = "QueryResult<Dish>")]
pub struct DeleteDish(pub i64);

// users

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<UserWithRole>>")]
pub struct FetchUsers;

#[derive(Message)]
#[rtype(result = "QueryResult<UserWithRole>")]
pub struct FetchUser(pub i64);

/// Carries the plaintext password; the handler hashes it on the sync-actor
/// thread before the insert.
#[derive(Message)]
#[rtype(result = "QueryResult<User>")]
pub struct CreateUser(pub NewUser);

#[derive(Message)]
#[rtype(result = "QueryResult<User>")]
pub struct UpdateUser {
    pub id: i64,
    pub changes: NewUser,
}

#[derive(Message)]
#[rtype(result = "QueryResult<User>")]
pub struct DeleteUser(pub i64);

// auth

pub enum RegistrationOutcome {
    Created(UserWithRole),
    /// A user with the same email or login already exists.
    Duplicate,
}

#[derive(Message)]
#[rtype(result = "QueryResult<RegistrationOutcome>")]
pub struct RegisterUser {
    pub last_name: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub login: String,
    pub user_password: String,
    pub email: String,
}

/// `Ok(None)` covers both an unknown email and a wrong password, so the
/// response cannot distinguish the two.
#[derive(Message)]
#[rtype(result = "QueryResult<Option<UserWithRole>>")]
pub struct LoginUser {
    pub email: String,
    pub password: String,
}

// orders

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderDishInput {
    pub dish_id: i64,
    pub quantity: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderDrinkInput {
    pub drink_id: i64,
    pub quantity: i32,
}

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<OrderSummary>>")]
pub struct FetchOrders;

#[derive(Message)]
#[rtype(result = "QueryResult<OrderDetails>")]
pub struct FetchOrder(pub i64);

/// Header plus line items, persisted in one transaction. The hydrated order
/// is re-read after commit.
#[derive(Message)]
#[rtype(result = "QueryResult<OrderDetails>")]
pub struct CreateOrder {
    pub header: NewOrder,
    pub dishes: Vec<OrderDishInput>,
    pub drinks: Vec<OrderDrinkInput>,
}

#[derive(Message)]
#[rtype(result = "QueryResult<Order>")]
pub struct UpdateOrder {
    pub id: i64,
    pub changes: NewOrder,
}

/// Cascades explicitly: dish lines, drink lines, then the header, all in one
/// transaction.
#[derive(Message)]
#[rtype(result = "QueryResult<Order>")]
pub struct DeleteOrder(pub i64);

// order line sub-resources

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<OrderDishWithTotal>>")]
pub struct FetchOrderDishes(pub i64);

#[derive(Message)]
#[rtype(result = "QueryResult<OrderDishLine>")]
pub struct AddOrderDish {
    pub order_id: i64,
    pub dish_id: i64,
    pub quantity: i32,
}

#[derive(Message)]
#[rtype(result = "QueryResult<OrderDishLine>")]
pub struct RemoveOrderDish {
    pub order_id: i64,
    pub dish_id: i64,
}

#[derive(Message)]
#[rtype(result = "QueryResult<Vec<OrderDrinkDetails>>")]
pub struct FetchOrderDrinks(pub i64);

#[derive(Message)]
#[rtype(result = "QueryResult<OrderDrinkLine>")]
pub struct AddOrderDrink {
    pub order_id: i64,
    pub drink_id: i64,
    pub quantity: i32,
}

#[derive(Message)]
#[rtype(result = "QueryResult<OrderDrinkLine>")]
pub struct RemoveOrderDrink {
    pub order_id: i64,
    pub drink_id: i64,
}
