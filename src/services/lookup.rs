//! Shared CRUD stack for the title-only lookup taxonomies (dish types,
//! payment types, pickup types). One macro, parameterized by table and key
//! column, generates the row types, the actor messages and handlers, and the
//! route scope, instead of hand-copying the same block per table.

use serde::Deserialize;

#[derive(Deserialize)]
pub struct TitleBody {
    pub title: Option<String>,
}

/// A `title` counts as present only when it is non-empty after trimming.
pub(crate) fn required_title(body: &TitleBody) -> Option<String> {
    body.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

macro_rules! lookup_entity {
    (
        $mod_name:ident,
        table: $table:ident,
        key: $key:ident,
        entity: $entity:ident,
        not_found: $not_found:literal,
        title_required: $title_required:literal,
        deleted: $deleted:literal
    ) => {
        pub mod $mod_name {
            use actix::Handler;
            use actix_web::web::{Data, Json, Path};
            use actix_web::{web, HttpResponse, Responder, Scope};
            use diesel::{ExpressionMethods, QueryDsl, QueryResult, RunQueryDsl};
            use serde::Serialize;

            use crate::services::db_utils::{AppState, PgActor};
            use crate::services::pg_handling::establish_connection;
            use crate::services::{mailbox_error, storage_error};
            use crate::types::ErrorBody;

            use super::{required_title, TitleBody};

            #[derive(diesel::Queryable, Debug, Clone, Serialize)]
            pub struct $entity {
                pub $key: i64,
                pub title: String,
            }

            #[derive(diesel::Insertable)]
            #[diesel(table_name = crate::schema::$table)]
            struct NewRow {
                title: String,
            }

            pub struct FetchAll;
            impl actix::Message for FetchAll {
                type Result = QueryResult<Vec<$entity>>;
            }

            pub struct GetById(pub i64);
            impl actix::Message for GetById {
                type Result = QueryResult<$entity>;
            }

            pub struct Create(pub String);
            impl actix::Message for Create {
                type Result = QueryResult<$entity>;
            }

            pub struct Update {
                pub id: i64,
                pub title: String,
            }
            impl actix::Message for Update {
                type Result = QueryResult<$entity>;
            }

            pub struct Delete(pub i64);
            impl actix::Message for Delete {
                type Result = QueryResult<$entity>;
            }

            impl Handler<FetchAll> for PgActor {
                type Result = QueryResult<Vec<$entity>>;

                fn handle(&mut self, _msg: FetchAll, _ctx: &mut Self::Context) -> Self::Result {
                    use crate::schema::$table::dsl::*;

                    let mut conn = establish_connection(&self.0)?;

                    $table.order($key.asc()).get_results::<$entity>(&mut conn)
                }
            }

            impl Handler<GetById> for PgActor {
                type Result = QueryResult<$entity>;

                fn handle(&mut self, msg: GetById, _ctx: &mut Self::Context) -> Self::Result {
                    use crate::schema::$table::dsl::*;

                    let mut conn = establish_connection(&self.0)?;

                    $table.find(msg.0).first(&mut conn)
                }
            }

            impl Handler<Create> for PgActor {
                type Result = QueryResult<$entity>;

                fn handle(&mut self, msg: Create, _ctx: &mut Self::Context) -> Self::Result {
                    use crate::schema::$table::dsl::*;

                    let mut conn = establish_connection(&self.0)?;

                    diesel::insert_into($table)
                        .values(NewRow { title: msg.0 })
                        .get_result::<$entity>(&mut conn)
                }
            }

            impl Handler<Update> for PgActor {
                type Result = QueryResult<$entity>;

                fn handle(&mut self, msg: Update, _ctx: &mut Self::Context) -> Self::Result {
                    use crate::schema::$table::dsl::*;

                    let mut conn = establish_connection(&self.0)?;

                    diesel::update($table.find(msg.id))
                        .set(title.eq(msg.title))
                        .get_result::<$entity>(&mut conn)
                }
            }

            impl Handler<Delete> for PgActor {
                type Result = QueryResult<$entity>;

                fn handle(&mut self, msg: Delete, _ctx: &mut Self::Context) -> Self::Result {
                    use crate::schema::$table::dsl::*;

                    let mut conn = establish_connection(&self.0)?;

                    diesel::delete($table.find(msg.0)).get_result::<$entity>(&mut conn)
                }
            }

            async fn fetch_all(state: Data<AppState>) -> impl Responder {
                match state.pg_db.send(FetchAll).await {
                    Ok(Ok(rows)) => HttpResponse::Ok().json(rows),
                    Ok(Err(err)) => storage_error(err, $not_found),
                    Err(err) => mailbox_error(err),
                }
            }

            async fn get_by_id(state: Data<AppState>, path: Path<i64>) -> impl Responder {
                match state.pg_db.send(GetById(path.into_inner())).await {
                    Ok(Ok(row)) => HttpResponse::Ok().json(row),
                    Ok(Err(err)) => storage_error(err, $not_found),
                    Err(err) => mailbox_error(err),
                }
            }

            async fn create(state: Data<AppState>, body: Json<TitleBody>) -> impl Responder {
                let title = match required_title(&body) {
                    Some(val) => val,
                    None => return HttpResponse::BadRequest().json(ErrorBody::new($title_required)),
                };

                match state.pg_db.send(Create(title)).await {
                    Ok(Ok(row)) => HttpResponse::Created().json(row),
                    Ok(Err(err)) => storage_error(err, $not_found),
                    Err(err) => mailbox_error(err),
                }
            }

            async fn update(state: Data<AppState>, path: Path<i64>, body: Json<TitleBody>) -> impl Responder {
                let title = match required_title(&body) {
                    Some(val) => val,
                    None => return HttpResponse::BadRequest().json(ErrorBody::new($title_required)),
                };

                match state.pg_db.send(Update { id: path.into_inner(), title }).await {
                    Ok(Ok(row)) => HttpResponse::Ok().json(row),
                    Ok(Err(err)) => storage_error(err, $not_found),
                    Err(err) => mailbox_error(err),
                }
            }

            async fn delete(state: Data<AppState>, path: Path<i64>) -> impl Responder {
                match state.pg_db.send(Delete(path.into_inner())).await {
                    Ok(Ok(row)) => {
                        HttpResponse::Ok().json(serde_json::json!({ "message": $deleted, "deleted": row }))
                    }
                    Ok(Err(err)) => storage_error(err, $not_found),
                    Err(err) => mailbox_error(err),
                }
            }

            pub fn scope(path: &str) -> Scope {
                web::scope(path)
                    .route("", web::get().to(fetch_all))
                    .route("", web::post().to(create))
                    .route("/{id}", web::get().to(get_by_id))
                    .route("/{id}", web::put().to(update))
                    .route("/{id}", web::delete().to(delete))
            }
        }
    };
}

lookup_entity!(
    dish_types,
    table: dish_types,
    key: id_dish_type,
    entity: DishType,
    not_found: "Dish type not found",
    title_required: "Dish type title is required",
    deleted: "Dish type deleted"
);

lookup_entity!(
    payment_types,
    table: payment_types,
    key: id_payment_type,
    entity: PaymentType,
    not_found: "Payment type not found",
    title_required: "Payment type title is required",
    deleted: "Payment type deleted"
);

lookup_entity!(
    pickup_types,
    table: pickup_types,
    key: id_pickup_type,
    entity: PickupType,
    not_found: "Pickup type not found",
    title_required: "Pickup type title is required",
    deleted: "Pickup type deleted"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_title_is_rejected() {
        assert_eq!(required_title(&TitleBody { title: None }), None);
        assert_eq!(required_title(&TitleBody { title: Some("".into()) }), None);
        assert_eq!(required_title(&TitleBody { title: Some("   ".into()) }), None);
    }

    #[test]
    fn present_title_is_trimmed() {
        assert_eq!(
            required_title(&TitleBody { title: Some(" card ".into()) }),
            Some("card".to_owned())
        );
    }
}
