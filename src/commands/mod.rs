pub mod split;
pub mod toc;
