pub mod audio;
pub mod config;

pub use self::audio::*;
pub use self::config::*;

use crate::health;
use actix_web::web;

/// Register every API route. Mounted under `/api/v1` by the server.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(health::detailed_metrics))
        .route("/config", web::get().to(get_config))
        .route("/config", web::put().to(update_config))
        .service(
            web::scope("/audio")
                .route("/detect", web::post().to(detect))
                .route("/wav", web::post().to(parse_wav))
                .route("/inspect", web::post().to(inspect))
                .route("/upload", web::post().to(upload)),
        );
}
