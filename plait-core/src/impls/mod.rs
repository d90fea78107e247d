mod list;
mod option;
mod pointer;
mod scalar;
