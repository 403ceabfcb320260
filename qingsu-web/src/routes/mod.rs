use actix_web::web;

use crate::auth;

pub mod activity;
pub mod admin;
pub mod api;
pub mod message;
pub mod profile;

pub fn configure_service(cfg: &mut web::ServiceConfig) {
    cfg.service(activity::activity_list)
        .service(activity::activity_detail)
        .service(activity::activity_register)
        .service(profile::my_profile)
        .service(profile::edit_profile_form)
        .service(profile::edit_profile)
        .service(auth::login)
        .service(auth::logout)
        .service(message::message_wall)
        .service(message::post_message)
        .service(
            web::scope("/api")
                .service(auth::token_obtain)
                .service(auth::token_refresh)
                .service(api::activities)
                .service(api::profile),
        )
        .service(
            web::scope("/admin")
                .service(admin::create_activity)
                .service(admin::update_activity)
                .service(admin::add_session)
                .service(admin::remove_session)
                .service(admin::list_registrations)
                .service(admin::batch_status)
                .service(admin::batch_hours)
                .service(admin::export_registrations)
                .service(admin::import_roster)
                .service(admin::import_hours)
                .service(admin::recompute_xp)
                .service(admin::create_announcement)
                .service(admin::moderate_messages)
                .service(admin::list_tags)
                .service(admin::create_tag)
                .service(admin::remove_tag),
        );
}
