use actix::{Addr, SyncArbiter};
use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::web::Data;
use actix_web::{error, web, App, HttpRequest, HttpResponse, HttpServer};
use dotenv::dotenv;
use tracing::info;

use resto_rust_back::services;
use resto_rust_back::services::db_utils::{get_db_pool, AppState, PgActor};
use resto_rust_back::services::lookup;
use resto_rust_back::services::messages::SeedRoles;
use resto_rust_back::settings::Settings;
use resto_rust_back::types::ErrorBody;

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

fn init_pg_db(settings: &Settings) -> Addr<PgActor> {
    let pool = get_db_pool(&settings.database_url())
        .expect("failed to initialize the PostgreSQL connection pool");

    SyncArbiter::start(5, move || PgActor(pool.clone()))
}

/// Malformed JSON bodies get the same `{"error": ...}` shape as every other
/// failure.
fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> error::Error {
    let response = HttpResponse::BadRequest().json(ErrorBody::new(err.to_string()));
    error::InternalError::from_response(err, response).into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    init_tracing();

    let settings = Settings::from_env().expect("environment configuration must be valid");
    let pg_db = init_pg_db(&settings);

    // Roles are an operational taxonomy: seeded once here, read-only through
    // the API.
    match pg_db.send(SeedRoles).await {
        Ok(Ok(0)) => info!("system roles already present"),
        Ok(Ok(count)) => info!("seeded {count} system role(s)"),
        Ok(Err(err)) => tracing::error!("failed to seed system roles: {err}"),
        Err(err) => tracing::error!("failed to seed system roles: {err}"),
    }

    let bind_addr = settings.bind_addr();
    info!("server listening on port {}", settings.port);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(Data::new(AppState { pg_db: pg_db.clone() }))
            .app_data(web::JsonConfig::default().error_handler(json_error_handler))
            .service(services::home_page)
            .service(
                web::scope("/api")
                    .service(services::diagnostics_route::api_alive)
                    .service(services::diagnostics_route::database_alive)
                    .service(
                        web::scope("/user-roles")
                            .service(services::roles_route::fetch_roles)
                            .service(services::roles_route::get_role),
                    )
                    .service(lookup::dish_types::scope("/dish-types"))
                    .service(lookup::payment_types::scope("/payment-types"))
                    .service(lookup::pickup_types::scope("/pickup-types"))
                    .service(
                        web::scope("/drinks")
                            .service(services::drinks_route::fetch_drinks)
                            .service(services::drinks_route::create_drink)
                            .service(services::drinks_route::get_drink)
                            .service(services::drinks_route::update_drink)
                            .service(services::drinks_route::delete_drink),
                    )
                    .service(
                        web::scope("/dishes")
                            .service(services::dishes_route::fetch_dishes)
                            .service(services::dishes_route::create_dish)
                            .service(services::dishes_route::get_dish)
                            .service(services::dishes_route::update_dish)
                            .service(services::dishes_route::delete_dish),
                    )
                    .service(
                        web::scope("/users")
                            .service(services::users_route::fetch_users)
                            .service(services::users_route::create_user)
                            .service(services::users_route::get_user)
                            .service(services::users_route::update_user)
                            .service(services::users_route::delete_user),
                    )
                    .service(
                        web::scope("/auth")
                            .service(services::auth_route::register)
                            .service(services::auth_route::login),
                    )
                    .service(
                        web::scope("/orders")
                            .service(services::orders_route::fetch_orders)
                            .service(services::orders_route::create_order)
                            .service(services::orders_route::fetch_order_dishes)
                            .service(services::orders_route::add_order_dish)
                            .service(services::orders_route::remove_order_dish)
                            .service(services::orders_route::fetch_order_drinks)
                            .service(services::orders_route::add_order_drink)
                            .service(services::orders_route::remove_order_drink)
                            .service(services::orders_route::get_order)
                            .service(services::orders_route::update_order)
                            .service(services::orders_route::delete_order),
                    ),
            )
    })
    .bind(bind_addr)?
    .run()
    .await
}
