use rocket::Route;

pub mod authorize;
pub mod callback;

pub fn routes() -> Vec<Route> {
    routes![authorize::authorize, callback::callback]
}
