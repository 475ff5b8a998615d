pub mod group_writer;
