// Testes de ponta a ponta: o router completo, em memória, via `oneshot`.
mod common;

mod auth;
mod group;
mod project;
mod role;
mod tenant;
