use actix_web::{get, HttpResponse, Responder};

use crate::types::ErrorBody;

pub mod db_models;
pub mod db_utils;
pub mod insertable;
pub mod lookup;
pub mod messages;
pub mod passwords;
pub mod pg_handling;

#[get("/")]
pub async fn home_page() -> impl Responder {
    HttpResponse::Ok().body("Restaurant ordering service")
}

/// Maps a diesel error to the response contract: `NotFound` becomes a 404
/// with the entity-specific message, anything else a 500 echoing the
/// underlying message.
pub fn storage_error(err: diesel::result::Error, not_found: &str) -> HttpResponse {
    match err {
        diesel::result::Error::NotFound => HttpResponse::NotFound().json(ErrorBody::new(not_found)),
        other => HttpResponse::InternalServerError().json(ErrorBody::new(other.to_string())),
    }
}

pub fn mailbox_error(err: actix::MailboxError) -> HttpResponse {
    HttpResponse::InternalServerError()
        .json(ErrorBody::new(format!("Unable to perform action: {err}")))
}

// sub-route "/api" (diagnostics)
pub mod diagnostics_route {
    use actix_web::web::Data;
    use actix_web::{get, HttpResponse, Responder};
    use chrono::Utc;

    use crate::services::db_utils::AppState;
    use crate::services::messages::PingDatabase;
    use crate::services::{mailbox_error, storage_error};

    #[get("/test")]
    pub async fn api_alive() -> impl Responder {
        HttpResponse::Ok().json(serde_json::json!({
            "message": "API is up",
            "timestamp": Utc::now(),
        }))
    }

    #[get("/test-db")]
    pub async fn database_alive(state: Data<AppState>) -> impl Responder {
        match state.pg_db.send(PingDatabase).await {
            Ok(Ok(current_time)) => HttpResponse::Ok().json(serde_json::json!({
                "message": "Database connection is up",
                "current_time": current_time,
            })),
            Ok(Err(err)) => storage_error(err, "Database connection is down"),
            Err(err) => mailbox_error(err),
        }
    }
}

// sub-route "/user-roles": read-only, the taxonomy is seeded at startup
pub mod roles_route {
    use actix_web::web::{Data, Path};
    use actix_web::{get, HttpResponse, Responder};

    use crate::services::db_utils::AppState;
    use crate::services::messages::{FetchRole, FetchRoles};
    use crate::services::{mailbox_error, storage_error};

    #[get("")]
    pub async fn fetch_roles(state: Data<AppState>) -> impl Responder {
        match state.pg_db.send(FetchRoles).await {
            Ok(Ok(roles)) => HttpResponse::Ok().json(roles),
            Ok(Err(err)) => storage_error(err, "Role not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}")]
    pub async fn get_role(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchRole(path.into_inner())).await {
            Ok(Ok(role)) => HttpResponse::Ok().json(role),
            Ok(Err(err)) => storage_error(err, "Role not found"),
            Err(err) => mailbox_error(err),
        }
    }
}

// sub-route "/drinks"
pub mod drinks_route {
    use actix_web::web::{Data, Json, Path};
    use actix_web::{delete, get, post, put, HttpResponse, Responder};
    use serde::Deserialize;

    use crate::services::db_utils::AppState;
    use crate::services::insertable::NewDrink;
    use crate::services::messages::{CreateDrink, DeleteDrink, FetchDrink, FetchDrinks, UpdateDrink};
    use crate::services::{mailbox_error, storage_error};
    use crate::types::ErrorBody;

    #[derive(Deserialize)]
    pub struct DrinkBody {
        pub title: Option<String>,
        pub price: Option<f64>,
        pub discount: Option<f64>,
        pub description: Option<String>,
        pub drink_image: Option<String>,
    }

    fn to_new_drink(body: &DrinkBody) -> Result<NewDrink, ErrorBody> {
        let title = match body.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(val) => val.to_owned(),
            None => return Err(ErrorBody::new("Drink title is required")),
        };
        let price = match body.price {
            Some(val) if val > 0.0 => val,
            _ => {
                return Err(ErrorBody::new(
                    "Drink price is required and must be greater than zero",
                ))
            }
        };

        Ok(NewDrink {
            title,
            price,
            discount: body.discount,
            description: body.description.clone(),
            drink_image: body.drink_image.clone(),
        })
    }

    #[get("")]
    pub async fn fetch_drinks(state: Data<AppState>) -> impl Responder {
        match state.pg_db.send(FetchDrinks).await {
            Ok(Ok(drinks)) => HttpResponse::Ok().json(drinks),
            Ok(Err(err)) => storage_error(err, "Drink not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}")]
    pub async fn get_drink(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchDrink(path.into_inner())).await {
            Ok(Ok(drink)) => HttpResponse::Ok().json(drink),
            Ok(Err(err)) => storage_error(err, "Drink not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("")]
    pub async fn create_drink(state: Data<AppState>, body: Json<DrinkBody>) -> impl Responder {
        let new_drink = match to_new_drink(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(CreateDrink(new_drink)).await {
            Ok(Ok(drink)) => HttpResponse::Created().json(drink),
            Ok(Err(err)) => storage_error(err, "Drink not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[put("/{id}")]
    pub async fn update_drink(state: Data<AppState>, path: Path<i64>, body: Json<DrinkBody>) -> impl Responder {
        let changes = match to_new_drink(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(UpdateDrink { id: path.into_inner(), changes }).await {
            Ok(Ok(drink)) => HttpResponse::Ok().json(drink),
            Ok(Err(err)) => storage_error(err, "Drink not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[delete("/{id}")]
    pub async fn delete_drink(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(DeleteDrink(path.into_inner())).await {
            Ok(Ok(drink)) => HttpResponse::Ok()
                .json(serde_json::json!({ "message": "Drink deleted", "deleted": drink })),
            Ok(Err(err)) => storage_error(err, "Drink not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn full_body() -> DrinkBody {
            DrinkBody {
                title: Some("Kvass".into()),
                price: Some(120.0),
                discount: Some(10.0),
                description: None,
                drink_image: None,
            }
        }

        #[test]
        fn complete_body_validates() {
            let drink = to_new_drink(&full_body()).unwrap();
            assert_eq!(drink.title, "Kvass");
            assert_eq!(drink.price, 120.0);
            assert_eq!(drink.discount, Some(10.0));
        }

        #[test]
        fn missing_or_blank_title_is_rejected() {
            for title in [None, Some("".to_owned()), Some("   ".to_owned())] {
                let mut body = full_body();
                body.title = title;
                match to_new_drink(&body) {
                    Err(err) => assert_eq!(err.error, "Drink title is required"),
                    Ok(_) => panic!("a drink without a title must not validate"),
                }
            }
        }

        #[test]
        fn missing_or_nonpositive_price_is_rejected() {
            for price in [None, Some(0.0), Some(-5.0)] {
                let mut body = full_body();
                body.price = price;
                match to_new_drink(&body) {
                    Err(err) => {
                        assert_eq!(err.error, "Drink price is required and must be greater than zero")
                    }
                    Ok(_) => panic!("a drink without a positive price must not validate"),
                }
            }
        }
    }
}

// sub-route "/dishes"
pub mod dishes_route {
    use actix_web::web::{Data, Json, Path};
    use actix_web::{delete, get, post, put, HttpResponse, Responder};
    use serde::Deserialize;

    use crate::services::db_utils::AppState;
    use crate::services::insertable::NewDish;
    use crate::services::messages::{CreateDish, DeleteDish, FetchDish, FetchDishes, UpdateDish};
    use crate::services::{mailbox_error, storage_error};
    use crate::types::ErrorBody;

    #[derive(Deserialize)]
    pub struct DishBody {
        pub dish_name: Option<String>,
        pub ingredients: Option<String>,
        pub dish_type_id: Option<i64>,
        pub price: Option<f64>,
        pub discount: Option<f64>,
        pub dish_image: Option<String>,
    }

    fn to_new_dish(body: &DishBody) -> Result<NewDish, ErrorBody> {
        let (dish_name, ingredients) = match (
            body.dish_name.as_deref().map(str::trim).filter(|v| !v.is_empty()),
            body.ingredients.as_deref().map(str::trim).filter(|v| !v.is_empty()),
        ) {
            (Some(name), Some(ingredients)) => (name.to_owned(), ingredients.to_owned()),
            _ => return Err(ErrorBody::new("All required fields must be filled")),
        };
        let dish_type_id = match body.dish_type_id {
            Some(val) => val,
            None => return Err(ErrorBody::new("All required fields must be filled")),
        };
        let price = match body.price {
            Some(val) if val > 0.0 => val,
            _ => {
                return Err(ErrorBody::new(
                    "Dish price is required and must be greater than zero",
                ))
            }
        };

        Ok(NewDish {
            dish_name,
            ingredients,
            dish_type_id,
            price,
            discount: body.discount,
            dish_image: body.dish_image.clone(),
        })
    }

    #[get("")]
    pub async fn fetch_dishes(state: Data<AppState>) -> impl Responder {
        match state.pg_db.send(FetchDishes).await {
            Ok(Ok(dishes)) => HttpResponse::Ok().json(dishes),
            Ok(Err(err)) => storage_error(err, "Dish not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}")]
    pub async fn get_dish(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchDish(path.into_inner())).await {
            Ok(Ok(dish)) => HttpResponse::Ok().json(dish),
            Ok(Err(err)) => storage_error(err, "Dish not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("")]
    pub async fn create_dish(state: Data<AppState>, body: Json<DishBody>) -> impl Responder {
        let new_dish = match to_new_dish(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(CreateDish(new_dish)).await {
            Ok(Ok(dish)) => HttpResponse::Created().json(dish),
            Ok(Err(err)) => storage_error(err, "Dish not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[put("/{id}")]
    pub async fn update_dish(state: Data<AppState>, path: Path<i64>, body: Json<DishBody>) -> impl Responder {
        let changes = match to_new_dish(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(UpdateDish { id: path.into_inner(), changes }).await {
            Ok(Ok(dish)) => HttpResponse::Ok().json(dish),
            Ok(Err(err)) => storage_error(err, "Dish not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[delete("/{id}")]
    pub async fn delete_dish(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(DeleteDish(path.into_inner())).await {
            Ok(Ok(dish)) => HttpResponse::Ok()
                .json(serde_json::json!({ "message": "Dish deleted", "deleted": dish })),
            Ok(Err(err)) => storage_error(err, "Dish not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn full_body() -> DishBody {
            DishBody {
                dish_name: Some("Borscht".into()),
                ingredients: Some("beet, cabbage, beef".into()),
                dish_type_id: Some(2),
                price: Some(450.0),
                discount: None,
                dish_image: None,
            }
        }

        #[test]
        fn complete_body_validates() {
            let dish = to_new_dish(&full_body()).unwrap();
            assert_eq!(dish.dish_name, "Borscht");
            assert_eq!(dish.dish_type_id, 2);
            assert_eq!(dish.price, 450.0);
        }

        #[test]
        fn each_missing_required_field_is_rejected() {
            let mut missing_name = full_body();
            missing_name.dish_name = None;
            let mut blank_ingredients = full_body();
            blank_ingredients.ingredients = Some("  ".into());
            let mut missing_type = full_body();
            missing_type.dish_type_id = None;

            for body in [missing_name, blank_ingredients, missing_type] {
                match to_new_dish(&body) {
                    Err(err) => assert_eq!(err.error, "All required fields must be filled"),
                    Ok(_) => panic!("a dish with a missing required field must not validate"),
                }
            }
        }

        #[test]
        fn missing_or_nonpositive_price_is_rejected() {
            for price in [None, Some(0.0), Some(-1.0)] {
                let mut body = full_body();
                body.price = price;
                match to_new_dish(&body) {
                    Err(err) => {
                        assert_eq!(err.error, "Dish price is required and must be greater than zero")
                    }
                    Ok(_) => panic!("a dish without a positive price must not validate"),
                }
            }
        }
    }
}

// sub-route "/users"
pub mod users_route {
    use actix_web::web::{Data, Json, Path};
    use actix_web::{delete, get, post, put, HttpResponse, Responder};
    use serde::Deserialize;

    use crate::services::db_utils::AppState;
    use crate::services::insertable::NewUser;
    use crate::services::messages::{CreateUser, DeleteUser, FetchUser, FetchUsers, UpdateUser};
    use crate::services::{mailbox_error, storage_error};
    use crate::types::ErrorBody;

    #[derive(Deserialize)]
    pub struct UserBody {
        pub last_name: Option<String>,
        pub first_name: Option<String>,
        pub middle_name: Option<String>,
        pub login: Option<String>,
        pub user_password: Option<String>,
        pub email: Option<String>,
        pub role_id: Option<i64>,
        pub personal_discount: Option<f64>,
    }

    fn to_new_user(body: &UserBody) -> Result<NewUser, ErrorBody> {
        match (
            body.last_name.clone(),
            body.first_name.clone(),
            body.login.clone(),
            body.user_password.clone(),
            body.email.clone(),
            body.role_id,
        ) {
            (
                Some(last_name),
                Some(first_name),
                Some(login),
                Some(user_password),
                Some(email),
                Some(role_id),
            ) => Ok(NewUser {
                last_name,
                first_name,
                middle_name: body.middle_name.clone(),
                login,
                user_password,
                email,
                role_id,
                personal_discount: body.personal_discount,
            }),
            _ => Err(ErrorBody::new("All required fields must be filled")),
        }
    }

    #[get("")]
    pub async fn fetch_users(state: Data<AppState>) -> impl Responder {
        match state.pg_db.send(FetchUsers).await {
            Ok(Ok(users)) => HttpResponse::Ok().json(users),
            Ok(Err(err)) => storage_error(err, "User not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}")]
    pub async fn get_user(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchUser(path.into_inner())).await {
            Ok(Ok(user)) => HttpResponse::Ok().json(user),
            Ok(Err(err)) => storage_error(err, "User not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("")]
    pub async fn create_user(state: Data<AppState>, body: Json<UserBody>) -> impl Responder {
        let new_user = match to_new_user(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(CreateUser(new_user)).await {
            Ok(Ok(user)) => HttpResponse::Created().json(user),
            Ok(Err(err)) => storage_error(err, "User not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[put("/{id}")]
    pub async fn update_user(state: Data<AppState>, path: Path<i64>, body: Json<UserBody>) -> impl Responder {
        let changes = match to_new_user(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(UpdateUser { id: path.into_inner(), changes }).await {
            Ok(Ok(user)) => HttpResponse::Ok().json(user),
            Ok(Err(err)) => storage_error(err, "User not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[delete("/{id}")]
    pub async fn delete_user(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(DeleteUser(path.into_inner())).await {
            Ok(Ok(user)) => HttpResponse::Ok()
                .json(serde_json::json!({ "message": "User deleted", "deleted": user })),
            Ok(Err(err)) => storage_error(err, "User not found"),
            Err(err) => mailbox_error(err),
        }
    }
}

// sub-route "/auth"
pub mod auth_route {
    use actix_web::web::{Data, Json};
    use actix_web::{post, HttpResponse, Responder};
    use diesel::result::Error;
    use serde::Deserialize;

    use crate::services::db_utils::AppState;
    use crate::services::messages::{LoginUser, RegisterUser, RegistrationOutcome};
    use crate::services::{mailbox_error, storage_error};
    use crate::types::ErrorBody;

    #[derive(Deserialize)]
    pub struct RegisterBody {
        pub last_name: Option<String>,
        pub first_name: Option<String>,
        pub middle_name: Option<String>,
        pub login: Option<String>,
        pub user_password: Option<String>,
        pub email: Option<String>,
    }

    #[derive(Deserialize)]
    pub struct LoginBody {
        pub email: Option<String>,
        pub password: Option<String>,
    }

    #[post("/register")]
    pub async fn register(state: Data<AppState>, body: Json<RegisterBody>) -> impl Responder {
        let msg = match (
            body.last_name.clone(),
            body.first_name.clone(),
            body.login.clone(),
            body.user_password.clone(),
            body.email.clone(),
        ) {
            (Some(last_name), Some(first_name), Some(user_login), Some(user_password), Some(email)) => {
                RegisterUser {
                    last_name,
                    first_name,
                    middle_name: body.middle_name.clone(),
                    login: user_login,
                    user_password,
                    email,
                }
            }
            _ => {
                return HttpResponse::BadRequest()
                    .json(ErrorBody::new("All required fields must be filled"))
            }
        };

        match state.pg_db.send(msg).await {
            Ok(Ok(RegistrationOutcome::Created(user))) => HttpResponse::Created().json(user),
            Ok(Ok(RegistrationOutcome::Duplicate)) => HttpResponse::BadRequest()
                .json(ErrorBody::new("A user with this email or login already exists")),
            Ok(Err(Error::NotFound)) => HttpResponse::InternalServerError()
                .json(ErrorBody::new("The \"user\" role is not initialized")),
            Ok(Err(err)) => HttpResponse::InternalServerError().json(ErrorBody::new(err.to_string())),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("/login")]
    pub async fn login(state: Data<AppState>, body: Json<LoginBody>) -> impl Responder {
        let msg = match (body.email.clone(), body.password.clone()) {
            (Some(email), Some(password)) => LoginUser { email, password },
            _ => {
                return HttpResponse::BadRequest()
                    .json(ErrorBody::new("Email and password are required"))
            }
        };

        match state.pg_db.send(msg).await {
            Ok(Ok(Some(user))) => HttpResponse::Ok().json(user),
            Ok(Ok(None)) => {
                HttpResponse::Unauthorized().json(ErrorBody::new("Invalid email or password"))
            }
            Ok(Err(err)) => storage_error(err, "Invalid email or password"),
            Err(err) => mailbox_error(err),
        }
    }
}

// sub-route "/orders"
pub mod orders_route {
    use actix_web::web::{Data, Json, Path};
    use actix_web::{delete, get, post, put, HttpResponse, Responder};
    use chrono::{DateTime, Utc};
    use serde::Deserialize;

    use crate::services::db_utils::AppState;
    use crate::services::insertable::NewOrder;
    use crate::services::messages::{
        AddOrderDish, AddOrderDrink, CreateOrder, DeleteOrder, FetchOrder, FetchOrderDishes,
        FetchOrderDrinks, FetchOrders, OrderDishInput, OrderDrinkInput, RemoveOrderDish,
        RemoveOrderDrink, UpdateOrder,
    };
    use crate::services::{mailbox_error, storage_error};
    use crate::types::ErrorBody;

    #[derive(Deserialize)]
    pub struct OrderBody {
        pub user_id: Option<i64>,
        pub payment_type_id: Option<i64>,
        pub pickup_type_id: Option<i64>,
        pub order_date: Option<DateTime<Utc>>,
        pub discount: Option<f64>,
        pub total_cost: Option<f64>,
        pub comment: Option<String>,
        pub order_status: Option<String>,
        #[serde(default)]
        pub dishes: Vec<OrderDishInput>,
        #[serde(default)]
        pub drinks: Vec<OrderDrinkInput>,
    }

    #[derive(Deserialize)]
    pub struct DishLineBody {
        pub dish_id: Option<i64>,
        pub quantity: Option<i32>,
    }

    #[derive(Deserialize)]
    pub struct DrinkLineBody {
        pub drink_id: Option<i64>,
        pub quantity: Option<i32>,
    }

    fn to_new_order(body: &OrderBody) -> Result<NewOrder, ErrorBody> {
        match (
            body.user_id,
            body.payment_type_id,
            body.pickup_type_id,
            body.order_date,
            body.total_cost,
        ) {
            (
                Some(user_id),
                Some(payment_type_id),
                Some(pickup_type_id),
                Some(order_date),
                Some(total_cost),
            ) => Ok(NewOrder {
                user_id,
                payment_type_id,
                pickup_type_id,
                order_date,
                discount: body.discount,
                total_cost,
                comment: body.comment.clone(),
                order_status: body.order_status.clone(),
            }),
            _ => Err(ErrorBody::new("All required fields must be filled")),
        }
    }

    #[get("")]
    pub async fn fetch_orders(state: Data<AppState>) -> impl Responder {
        match state.pg_db.send(FetchOrders).await {
            Ok(Ok(orders)) => HttpResponse::Ok().json(orders),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}")]
    pub async fn get_order(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchOrder(path.into_inner())).await {
            Ok(Ok(order)) => HttpResponse::Ok().json(order),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("")]
    pub async fn create_order(state: Data<AppState>, body: Json<OrderBody>) -> impl Responder {
        // Fail fast: nothing reaches the pool until the header validates.
        let header = match to_new_order(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };
        let body = body.into_inner();

        match state
            .pg_db
            .send(CreateOrder { header, dishes: body.dishes, drinks: body.drinks })
            .await
        {
            Ok(Ok(order)) => HttpResponse::Created().json(order),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[put("/{id}")]
    pub async fn update_order(state: Data<AppState>, path: Path<i64>, body: Json<OrderBody>) -> impl Responder {
        let changes = match to_new_order(&body) {
            Ok(val) => val,
            Err(err) => return HttpResponse::BadRequest().json(err),
        };

        match state.pg_db.send(UpdateOrder { id: path.into_inner(), changes }).await {
            Ok(Ok(order)) => HttpResponse::Ok().json(order),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[delete("/{id}")]
    pub async fn delete_order(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(DeleteOrder(path.into_inner())).await {
            Ok(Ok(order)) => HttpResponse::Ok()
                .json(serde_json::json!({ "message": "Order deleted", "deleted": order })),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}/dishes")]
    pub async fn fetch_order_dishes(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchOrderDishes(path.into_inner())).await {
            Ok(Ok(lines)) => HttpResponse::Ok().json(lines),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("/{id}/dishes")]
    pub async fn add_order_dish(state: Data<AppState>, path: Path<i64>, body: Json<DishLineBody>) -> impl Responder {
        let (dish_id, quantity) = match (body.dish_id, body.quantity.filter(|q| *q != 0)) {
            (Some(dish_id), Some(quantity)) => (dish_id, quantity),
            _ => {
                return HttpResponse::BadRequest()
                    .json(ErrorBody::new("dish_id and quantity are required"))
            }
        };

        match state
            .pg_db
            .send(AddOrderDish { order_id: path.into_inner(), dish_id, quantity })
            .await
        {
            Ok(Ok(line)) => HttpResponse::Created().json(line),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[delete("/{order_id}/dishes/{dish_id}")]
    pub async fn remove_order_dish(state: Data<AppState>, path: Path<(i64, i64)>) -> impl Responder {
        let (order_id, dish_id) = path.into_inner();

        match state.pg_db.send(RemoveOrderDish { order_id, dish_id }).await {
            Ok(Ok(line)) => HttpResponse::Ok()
                .json(serde_json::json!({ "message": "Dish removed from order", "deleted": line })),
            Ok(Err(err)) => storage_error(err, "Dish not found in order"),
            Err(err) => mailbox_error(err),
        }
    }

    #[get("/{id}/drinks")]
    pub async fn fetch_order_drinks(state: Data<AppState>, path: Path<i64>) -> impl Responder {
        match state.pg_db.send(FetchOrderDrinks(path.into_inner())).await {
            Ok(Ok(lines)) => HttpResponse::Ok().json(lines),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[post("/{id}/drinks")]
    pub async fn add_order_drink(state: Data<AppState>, path: Path<i64>, body: Json<DrinkLineBody>) -> impl Responder {
        let (drink_id, quantity) = match (body.drink_id, body.quantity.filter(|q| *q != 0)) {
            (Some(drink_id), Some(quantity)) => (drink_id, quantity),
            _ => {
                return HttpResponse::BadRequest()
                    .json(ErrorBody::new("drink_id and quantity are required"))
            }
        };

        match state
            .pg_db
            .send(AddOrderDrink { order_id: path.into_inner(), drink_id, quantity })
            .await
        {
            Ok(Ok(line)) => HttpResponse::Created().json(line),
            Ok(Err(err)) => storage_error(err, "Order not found"),
            Err(err) => mailbox_error(err),
        }
    }

    #[delete("/{order_id}/drinks/{drink_id}")]
    pub async fn remove_order_drink(state: Data<AppState>, path: Path<(i64, i64)>) -> impl Responder {
        let (order_id, drink_id) = path.into_inner();

        match state.pg_db.send(RemoveOrderDrink { order_id, drink_id }).await {
            Ok(Ok(line)) => HttpResponse::Ok().json(
                serde_json::json!({ "message": "Drink removed from order", "deleted": line }),
            ),
            Ok(Err(err)) => storage_error(err, "Drink not found in order"),
            Err(err) => mailbox_error(err),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn full_body() -> OrderBody {
            OrderBody {
                user_id: Some(1),
                payment_type_id: Some(1),
                pickup_type_id: Some(1),
                order_date: Some("2024-01-01T10:00:00Z".parse().unwrap()),
                discount: None,
                total_cost: Some(1500.0),
                comment: None,
                order_status: None,
                dishes: vec![OrderDishInput { dish_id: 3, quantity: 2 }],
                drinks: vec![OrderDrinkInput { drink_id: 5, quantity: 1 }],
            }
        }

        #[test]
        fn complete_header_validates() {
            let header = to_new_order(&full_body()).unwrap();
            assert_eq!(header.user_id, 1);
            assert_eq!(header.payment_type_id, 1);
            assert_eq!(header.pickup_type_id, 1);
            assert_eq!(header.total_cost, 1500.0);
            assert_eq!(header.discount, None);
        }

        #[test]
        fn each_missing_required_header_field_is_rejected() {
            // Validation runs before any message is sent, so a rejection here
            // never reaches the pool.
            let mut missing_user = full_body();
            missing_user.user_id = None;
            let mut missing_payment = full_body();
            missing_payment.payment_type_id = None;
            let mut missing_pickup = full_body();
            missing_pickup.pickup_type_id = None;
            let mut missing_date = full_body();
            missing_date.order_date = None;
            let mut missing_total = full_body();
            missing_total.total_cost = None;

            for body in [
                missing_user,
                missing_payment,
                missing_pickup,
                missing_date,
                missing_total,
            ] {
                match to_new_order(&body) {
                    Err(err) => assert_eq!(err.error, "All required fields must be filled"),
                    Ok(_) => panic!("a header with a missing required field must not validate"),
                }
            }
        }

        #[test]
        fn optional_header_fields_pass_through() {
            let mut body = full_body();
            body.discount = Some(15.0);
            body.comment = Some("no onions".into());
            body.order_status = Some("new".into());

            let header = to_new_order(&body).unwrap();
            assert_eq!(header.discount, Some(15.0));
            assert_eq!(header.comment.as_deref(), Some("no onions"));
            assert_eq!(header.order_status.as_deref(), Some("new"));
        }
    }
}
