pub mod quote_dto;
