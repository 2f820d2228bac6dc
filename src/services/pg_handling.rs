use actix::Handler;
use chrono::NaiveDateTime;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error};
use diesel::{
    BoolExpressionMethods, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl,
    QueryResult, RunQueryDsl,
};

use crate::schema::{
    dish_types, dishes, drinks, order_dishes, order_drinks, orders, payment_types, pickup_types,
    user_roles, users,
};
use crate::services::db_models::{
    Dish, DishWithType, Drink, Order, OrderDetails, OrderDishDetails, OrderDishLine,
    OrderDishWithTotal, OrderDrinkDetails, OrderDrinkLine, OrderSummary, Role, User, UserWithRole,
};
use crate::services::db_utils::PgActor;
use crate::services::insertable::{NewOrderDish, NewOrderDrink, NewRole};
use crate::services::messages::{
    AddOrderDish, AddOrderDrink, CreateDish, CreateDrink, CreateOrder, CreateUser, DeleteDish,
    DeleteDrink, DeleteOrder, DeleteUser, FetchDish, FetchDishes, FetchDrink, FetchDrinks,
    FetchOrder, FetchOrderDishes, FetchOrderDrinks, FetchOrders, FetchRole, FetchRoles, FetchUser,
    FetchUsers, LoginUser, PingDatabase, RegisterUser, RegistrationOutcome, RemoveOrderDish,
    RemoveOrderDrink, SeedRoles, UpdateDish, UpdateDrink, UpdateOrder, UpdateUser,
};
use crate::services::passwords::{hash_password, verify_password};

pub(crate) fn establish_connection(
    pool: &Pool<ConnectionManager<PgConnection>>,
) -> Result<PooledConnection<ConnectionManager<PgConnection>>, Error> {
    match pool.get() {
        Ok(val) => Ok(val),
        Err(_) => Err(connection_err()),
    }
}

fn connection_err() -> Error {
    Error::DatabaseError(
        DatabaseErrorKind::ClosedConnection,
        Box::new("Failed to establish connection".to_owned()),
    )
}

fn storage_err(msg: &str) -> Error {
    Error::DatabaseError(
        DatabaseErrorKind::UnableToSendCommand,
        Box::new(msg.to_owned()),
    )
}

/// Assembles the joined header plus both line item arrays. Runs on a plain
/// connection, outside any transaction.
fn load_order_details(conn: &mut PgConnection, order_id: i64) -> QueryResult<OrderDetails> {
    let (order, first_name, last_name, payment_type_title, pickup_type_title) = orders::table
        .inner_join(users::table)
        .inner_join(payment_types::table)
        .inner_join(pickup_types::table)
        .filter(orders::id_order.eq(order_id))
        .select((
            orders::all_columns,
            users::first_name,
            users::last_name,
            payment_types::title,
            pickup_types::title,
        ))
        .first::<(Order, String, String, String, String)>(conn)?;

    let dish_lines = order_dishes::table
        .inner_join(dishes::table)
        .filter(order_dishes::order_id.eq(order_id))
        .select((order_dishes::all_columns, dishes::dish_name, dishes::price))
        .load::<(OrderDishLine, String, f64)>(conn)?
        .into_iter()
        .map(|(line, dish_name, price)| OrderDishDetails { line, dish_name, price })
        .collect();

    let drink_lines = order_drinks::table
        .inner_join(drinks::table)
        .filter(order_drinks::order_id.eq(order_id))
        .select((order_drinks::all_columns, drinks::title))
        .load::<(OrderDrinkLine, String)>(conn)?
        .into_iter()
        .map(|(line, drink_title)| OrderDrinkDetails { line, drink_title })
        .collect();

    Ok(OrderDetails {
        summary: OrderSummary {
            user_name: format!("{first_name} {last_name}"),
            payment_type_title,
            pickup_type_title,
            order,
        },
        dishes: dish_lines,
        drinks: drink_lines,
    })
}

impl Handler<PingDatabase> for PgActor {
    type Result = QueryResult<NaiveDateTime>;

    fn handle(&mut self, _msg: PingDatabase, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::select(diesel::dsl::now).get_result::<NaiveDateTime>(&mut conn)
    }
}

impl Handler<SeedRoles> for PgActor {
    type Result = QueryResult<usize>;

    fn handle(&mut self, _msg: SeedRoles, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        conn.build_transaction().run(|trx_conn| {
            let existing: Vec<String> = user_roles::table
                .filter(user_roles::title.eq_any(["user", "admin"]))
                .select(user_roles::title)
                .load(trx_conn)?;

            let mut inserted = 0;
            for role in ["user", "admin"] {
                if !existing.iter().any(|title| title == role) {
                    diesel::insert_into(user_roles::table)
                        .values(NewRole { title: role.to_owned() })
                        .execute(trx_conn)?;
                    inserted += 1;
                }
            }

            Ok(inserted)
        })
    }
}

impl Handler<FetchRoles> for PgActor {
    type Result = QueryResult<Vec<Role>>;

    fn handle(&mut self, _msg: FetchRoles, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        user_roles::table
            .order(user_roles::id_role.asc())
            .get_results::<Role>(&mut conn)
    }
}

impl Handler<FetchRole> for PgActor {
    type Result = QueryResult<Role>;

    fn handle(&mut self, msg: FetchRole, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        user_roles::table.find(msg.0).first(&mut conn)
    }
}

impl Handler<FetchDrinks> for PgActor {
    type Result = QueryResult<Vec<Drink>>;

    fn handle(&mut self, _msg: FetchDrinks, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        drinks::table
            .order(drinks::id_drink.asc())
            .get_results::<Drink>(&mut conn)
    }
}

impl Handler<FetchDrink> for PgActor {
    type Result = QueryResult<Drink>;

    fn handle(&mut self, msg: FetchDrink, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        drinks::table.find(msg.0).first(&mut conn)
    }
}

impl Handler<CreateDrink> for PgActor {
    type Result = QueryResult<Drink>;

    fn handle(&mut self, msg: CreateDrink, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::insert_into(drinks::table)
            .values(msg.0)
            .get_result::<Drink>(&mut conn)
    }
}

impl Handler<UpdateDrink> for PgActor {
    type Result = QueryResult<Drink>;

    fn handle(&mut self, msg: UpdateDrink, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::update(drinks::table.find(msg.id))
            .set(msg.changes)
            .get_result::<Drink>(&mut conn)
    }
}

impl Handler<DeleteDrink> for PgActor {
    type Result = QueryResult<Drink>;

    fn handle(&mut self, msg: DeleteDrink, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::delete(drinks::table.find(msg.0)).get_result::<Drink>(&mut conn)
    }
}

impl Handler<FetchDishes> for PgActor {
    type Result = QueryResult<Vec<DishWithType>>;

    fn handle(&mut self, _msg: FetchDishes, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        dishes::table
            .inner_join(dish_types::table)
            .order(dishes::id_dish.asc())
            .select((dishes::all_columns, dish_types::title))
            .load::<(Dish, String)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(dish, dish_type_title)| DishWithType { dish, dish_type_title })
                    .collect()
            })
    }
}

impl Handler<FetchDish> for PgActor {
    type Result = QueryResult<DishWithType>;

    fn handle(&mut self, msg: FetchDish, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        dishes::table
            .inner_join(dish_types::table)
            .filter(dishes::id_dish.eq(msg.0))
            .select((dishes::all_columns, dish_types::title))
            .first::<(Dish, String)>(&mut conn)
            .map(|(dish, dish_type_title)| DishWithType { dish, dish_type_title })
    }
}

impl Handler<CreateDish> for PgActor {
    type Result = QueryResult<Dish>;

    fn handle(&mut self, msg: CreateDish, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::insert_into(dishes::table)
            .values(msg.0)
            .get_result::<Dish>(&mut conn)
    }
}

impl Handler<UpdateDish> for PgActor {
    type Result = QueryResult<Dish>;

    fn handle(&mut self, msg: UpdateDish, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::update(dishes::table.find(msg.id))
            .set(msg.changes)
            .get_result::<Dish>(&mut conn)
    }
}

impl Handler<DeleteDish> for PgActor {
    type Result = QueryResult<Dish>;

    fn handle(&mut self, msg: DeleteDish, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::delete(dishes::table.find(msg.0)).get_result::<Dish>(&mut conn)
    }
}

impl Handler<FetchUsers> for PgActor {
    type Result = QueryResult<Vec<UserWithRole>>;

    fn handle(&mut self, _msg: FetchUsers, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        users::table
            .inner_join(user_roles::table)
            .order(users::id_user.asc())
            .select((users::all_columns, user_roles::title))
            .load::<(User, String)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(user, role_title)| UserWithRole { user, role_title })
                    .collect()
            })
    }
}

impl Handler<FetchUser> for PgActor {
    type Result = QueryResult<UserWithRole>;

    fn handle(&mut self, msg: FetchUser, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        users::table
            .inner_join(user_roles::table)
            .filter(users::id_user.eq(msg.0))
            .select((users::all_columns, user_roles::title))
            .first::<(User, String)>(&mut conn)
            .map(|(user, role_title)| UserWithRole { user, role_title })
    }
}

impl Handler<CreateUser> for PgActor {
    type Result = QueryResult<User>;

    fn handle(&mut self, msg: CreateUser, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        let mut new_user = msg.0;
        new_user.user_password = hash_password(&new_user.user_password)
            .map_err(|err| storage_err(&format!("Failed to hash password: {err}")))?;

        diesel::insert_into(users::table)
            .values(new_user)
            .get_result::<User>(&mut conn)
    }
}

impl Handler<UpdateUser> for PgActor {
    type Result = QueryResult<User>;

    fn handle(&mut self, msg: UpdateUser, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        let mut changes = msg.changes;
        changes.user_password = hash_password(&changes.user_password)
            .map_err(|err| storage_err(&format!("Failed to hash password: {err}")))?;

        diesel::update(users::table.find(msg.id))
            .set(changes)
            .get_result::<User>(&mut conn)
    }
}

impl Handler<DeleteUser> for PgActor {
    type Result = QueryResult<User>;

    fn handle(&mut self, msg: DeleteUser, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::delete(users::table.find(msg.0)).get_result::<User>(&mut conn)
    }
}

impl Handler<RegisterUser> for PgActor {
    type Result = QueryResult<RegistrationOutcome>;

    fn handle(&mut self, msg: RegisterUser, _ctx: &mut Self::Context) -> Self::Result {
        use crate::services::insertable::NewUser;

        let mut conn = establish_connection(&self.0)?;

        let duplicate = users::table
            .filter(users::email.eq(&msg.email).or(users::login.eq(&msg.login)))
            .select(users::id_user)
            .first::<i64>(&mut conn)
            .optional()?;
        if duplicate.is_some() {
            return Ok(RegistrationOutcome::Duplicate);
        }

        // Self-registration always gets the seeded "user" role, never "admin".
        let role_id = user_roles::table
            .filter(user_roles::title.eq("user"))
            .select(user_roles::id_role)
            .first::<i64>(&mut conn)?;

        let user_password = hash_password(&msg.user_password)
            .map_err(|err| storage_err(&format!("Failed to hash password: {err}")))?;

        let user = diesel::insert_into(users::table)
            .values(NewUser {
                last_name: msg.last_name,
                first_name: msg.first_name,
                middle_name: msg.middle_name,
                login: msg.login,
                user_password,
                email: msg.email,
                role_id,
                personal_discount: None,
            })
            .get_result::<User>(&mut conn)?;

        let role_title = user_roles::table
            .find(user.role_id)
            .select(user_roles::title)
            .first::<String>(&mut conn)?;

        Ok(RegistrationOutcome::Created(UserWithRole { user, role_title }))
    }
}

impl Handler<LoginUser> for PgActor {
    type Result = QueryResult<Option<UserWithRole>>;

    fn handle(&mut self, msg: LoginUser, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        let row = users::table
            .inner_join(user_roles::table)
            .filter(users::email.eq(&msg.email))
            .select((users::all_columns, user_roles::title))
            .first::<(User, String)>(&mut conn)
            .optional()?;

        match row {
            Some((user, role_title)) if verify_password(&msg.password, &user.user_password) => {
                Ok(Some(UserWithRole { user, role_title }))
            }
            _ => Ok(None),
        }
    }
}

impl Handler<FetchOrders> for PgActor {
    type Result = QueryResult<Vec<OrderSummary>>;

    fn handle(&mut self, _msg: FetchOrders, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        orders::table
            .inner_join(users::table)
            .inner_join(payment_types::table)
            .inner_join(pickup_types::table)
            .order(orders::order_date.desc())
            .select((
                orders::all_columns,
                users::first_name,
                users::last_name,
                payment_types::title,
                pickup_types::title,
            ))
            .load::<(Order, String, String, String, String)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(order, first_name, last_name, payment_type_title, pickup_type_title)| {
                        OrderSummary {
                            user_name: format!("{first_name} {last_name}"),
                            payment_type_title,
                            pickup_type_title,
                            order,
                        }
                    })
                    .collect()
            })
    }
}

impl Handler<FetchOrder> for PgActor {
    type Result = QueryResult<OrderDetails>;

    fn handle(&mut self, msg: FetchOrder, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        load_order_details(&mut conn, msg.0)
    }
}

impl Handler<CreateOrder> for PgActor {
    type Result = QueryResult<OrderDetails>;

    fn handle(&mut self, msg: CreateOrder, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        // Header and line items commit together or not at all. Line inserts
        // run sequentially, in array order, on the one transaction
        // connection.
        let order_id = conn.build_transaction().run(|trx_conn| {
            let new_id = diesel::insert_into(orders::table)
                .values(&msg.header)
                .returning(orders::id_order)
                .get_result::<i64>(trx_conn)?;

            for line in &msg.dishes {
                diesel::insert_into(order_dishes::table)
                    .values(NewOrderDish {
                        order_id: new_id,
                        dish_id: line.dish_id,
                        quantity: line.quantity,
                    })
                    .execute(trx_conn)?;
            }

            for line in &msg.drinks {
                diesel::insert_into(order_drinks::table)
                    .values(NewOrderDrink {
                        order_id: new_id,
                        drink_id: line.drink_id,
                        quantity: line.quantity,
                    })
                    .execute(trx_conn)?;
            }

            Ok::<i64, diesel::result::Error>(new_id)
        })?;

        // The hydrated response is read back after the commit.
        load_order_details(&mut conn, order_id)
    }
}

impl Handler<UpdateOrder> for PgActor {
    type Result = QueryResult<Order>;

    fn handle(&mut self, msg: UpdateOrder, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        diesel::update(orders::table.find(msg.id))
            .set(msg.changes)
            .get_result::<Order>(&mut conn)
    }
}

impl Handler<DeleteOrder> for PgActor {
    type Result = QueryResult<Order>;

    fn handle(&mut self, msg: DeleteOrder, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        // The storage schema has no ON DELETE CASCADE; the cascade is
        // explicit here, inside one transaction.
        conn.build_transaction().run(|trx_conn| {
            diesel::delete(order_dishes::table.filter(order_dishes::order_id.eq(msg.0)))
                .execute(trx_conn)?;
            diesel::delete(order_drinks::table.filter(order_drinks::order_id.eq(msg.0)))
                .execute(trx_conn)?;

            diesel::delete(orders::table.find(msg.0)).get_result::<Order>(trx_conn)
        })
    }
}

impl Handler<FetchOrderDishes> for PgActor {
    type Result = QueryResult<Vec<OrderDishWithTotal>>;

    fn handle(&mut self, msg: FetchOrderDishes, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        order_dishes::table
            .inner_join(dishes::table)
            .filter(order_dishes::order_id.eq(msg.0))
            .select((order_dishes::all_columns, dishes::dish_name, dishes::price))
            .load::<(OrderDishLine, String, f64)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(line, dish_name, price)| {
                        let total_price = price * f64::from(line.quantity);
                        OrderDishWithTotal {
                            details: OrderDishDetails { line, dish_name, price },
                            total_price,
                        }
                    })
                    .collect()
            })
    }
}

impl Handler<AddOrderDish> for PgActor {
    type Result = QueryResult<OrderDishLine>;

    fn handle(&mut self, msg: AddOrderDish, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        // Existence check first so a missing order maps to 404 rather than a
        // foreign-key failure.
        orders::table
            .find(msg.order_id)
            .select(orders::id_order)
            .first::<i64>(&mut conn)?;

        diesel::insert_into(order_dishes::table)
            .values(NewOrderDish {
                order_id: msg.order_id,
                dish_id: msg.dish_id,
                quantity: msg.quantity,
            })
            .get_result::<OrderDishLine>(&mut conn)
    }
}

impl Handler<RemoveOrderDish> for PgActor {
    type Result = QueryResult<OrderDishLine>;

    fn handle(&mut self, msg: RemoveOrderDish, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        let removed = diesel::delete(
            order_dishes::table
                .filter(order_dishes::order_id.eq(msg.order_id))
                .filter(order_dishes::dish_id.eq(msg.dish_id)),
        )
        .get_results::<OrderDishLine>(&mut conn)?;

        removed.into_iter().next().ok_or(Error::NotFound)
    }
}

impl Handler<FetchOrderDrinks> for PgActor {
    type Result = QueryResult<Vec<OrderDrinkDetails>>;

    fn handle(&mut self, msg: FetchOrderDrinks, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        order_drinks::table
            .inner_join(drinks::table)
            .filter(order_drinks::order_id.eq(msg.0))
            .select((order_drinks::all_columns, drinks::title))
            .load::<(OrderDrinkLine, String)>(&mut conn)
            .map(|rows| {
                rows.into_iter()
                    .map(|(line, drink_title)| OrderDrinkDetails { line, drink_title })
                    .collect()
            })
    }
}

impl Handler<AddOrderDrink> for PgActor {
    type Result = QueryResult<OrderDrinkLine>;

    fn handle(&mut self, msg: AddOrderDrink, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        orders::table
            .find(msg.order_id)
            .select(orders::id_order)
            .first::<i64>(&mut conn)?;

        diesel::insert_into(order_drinks::table)
            .values(NewOrderDrink {
                order_id: msg.order_id,
                drink_id: msg.drink_id,
                quantity: msg.quantity,
            })
            .get_result::<OrderDrinkLine>(&mut conn)
    }
}

impl Handler<RemoveOrderDrink> for PgActor {
    type Result = QueryResult<OrderDrinkLine>;

    fn handle(&mut self, msg: RemoveOrderDrink, _ctx: &mut Self::Context) -> Self::Result {
        let mut conn = establish_connection(&self.0)?;

        let removed = diesel::delete(
            order_drinks::table
                .filter(order_drinks::order_id.eq(msg.order_id))
                .filter(order_drinks::drink_id.eq(msg.drink_id)),
        )
        .get_results::<OrderDrinkLine>(&mut conn)?;

        removed.into_iter().next().ok_or(Error::NotFound)
    }
}
