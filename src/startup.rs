use actix_web::{middleware::Logger, web, App, HttpServer};
use actix_files as fs;
use std::net::TcpListener;
use actix_web::dev::Server;

use crate::auth::RefreshTokenStore;
use crate::configuration::Settings;
use crate::middleware::{FileserverHits, HitCounter};
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset, revoke,
};
use crate::storage::Storage;

pub fn run(
    listener: TcpListener,
    storage: Storage,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let refresh_tokens = web::Data::new(RefreshTokenStore::new(
        storage.refresh_tokens.clone(),
        settings.jwt.refresh_token_ttl(),
    ));
    let storage = web::Data::new(storage);
    let jwt_config = web::Data::new(settings.jwt);
    let polka_config = web::Data::new(settings.polka);
    let static_dir = settings.application.static_dir.clone();
    let application = web::Data::new(settings.application);
    let hits = web::Data::new(FileserverHits::new());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())

            // Shared state
            .app_data(storage.clone())
            .app_data(refresh_tokens.clone())
            .app_data(jwt_config.clone())
            .app_data(polka_config.clone())
            .app_data(application.clone())
            .app_data(hits.clone())

            // Static site, every request counted
            .service(
                web::scope("/app")
                    .wrap(HitCounter::new(hits.clone()))
                    .service(fs::Files::new("/", &static_dir).index_file("index.html")),
            )

            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )

            // Protected handlers take an `AuthenticatedUser` argument
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(create_user))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .service(
                        web::resource("/chirps")
                            .route(web::get().to(list_chirps))
                            .route(web::post().to(create_chirp)),
                    )
                    .service(
                        web::resource("/chirps/{chirp_id}")
                            .route(web::get().to(get_chirp))
                            .route(web::delete().to(delete_chirp)),
                    )
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
