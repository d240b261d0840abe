mod allreduce;
mod group;
mod tree;
