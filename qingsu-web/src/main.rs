use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;

use qingsu_db::connection::create_connection_pool;
use qingsu_db::run_migrations;
use qingsu_web::config::Config;
use qingsu_web::configure_service;
use qingsu_web::gate::AccessGate;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let pool = create_connection_pool(&config.database_url);
    run_migrations(&pool);

    let bind_addr = config.bind_addr.clone();
    log::info!("启动于 {}", bind_addr);

    HttpServer::new(move || {
        let cors = if config.trusted_origins.is_empty() {
            Cors::permissive()
        } else {
            let mut cors = Cors::default();
            for origin in &config.trusted_origins {
                cors = cors.allowed_origin(origin);
            }
            cors
        };
        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            // 最后注册的中间件最先执行，夜间闭站要挡在一切之前
            .wrap(AccessGate::new(config.tz_offset_hours))
            .data(pool.clone())
            .data(config.clone())
            .configure(configure_service)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
