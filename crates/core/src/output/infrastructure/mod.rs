pub mod folder_group_writer;
