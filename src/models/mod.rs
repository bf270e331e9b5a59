pub mod department;
pub mod medicine;
