pub mod sfnt;
