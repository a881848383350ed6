mod countdown;
mod persistence;
