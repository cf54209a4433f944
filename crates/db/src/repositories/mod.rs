pub mod recipe_repo;

pub use recipe_repo::RecipeRepo;
