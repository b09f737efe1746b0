pub mod gen_eval;
pub mod template;
