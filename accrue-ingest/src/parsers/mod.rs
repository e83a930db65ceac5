pub mod ynab_register;
