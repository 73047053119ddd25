pub mod course;
pub mod department;
pub mod enrollment;
pub mod favorite;
pub mod rules;
pub mod student;
